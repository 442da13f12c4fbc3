/// Append-only status lines shown in the form, mirrored to the log.
#[derive(Debug, Clone, Default)]
pub struct StatusLog {
    lines: Vec<String>,
}

impl StatusLog {
    pub fn with_welcome() -> Self {
        let mut log = Self::default();
        log.lines.push("Welcome to the Guideline Checker.".to_string());
        log.lines
            .push("Please select the required files and enter parameters to begin.".to_string());
        log
    }

    pub fn info(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::info!("{line}");
        self.lines.push(line);
    }

    pub fn warn(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::warn!("{line}");
        self.lines.push(line);
    }

    pub fn error(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::error!("{line}");
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[cfg(test)]
impl StatusLog {
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}
