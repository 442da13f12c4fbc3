use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

const DISEASES: &[(&str, &[&str])] = &[
    ("Type 2 Diabetes Mellitus", &["Metformin 500mg BD", "Insulin glargine 10u", "Diet control only"]),
    ("DM2 with neuropathy", &["Metformin + pregabalin", "Gliclazide 80mg"]),
    ("Essential Hypertension", &["Amlodipine 5mg", "Losartan 50mg", "No medication"]),
    ("Bronchial Asthma", &["Salbutamol inhaler PRN", "Budesonide/formoterol", "Oral prednisolone"]),
    ("Community-acquired pneumonia", &["Amoxicillin 1g TDS", "Ceftriaxone IV", "Azithromycin"]),
    ("Acute gastroenteritis", &["ORS + zinc", "IV fluids", "Ciprofloxacin"]),
];

fn main() -> Result<(), XlsxError> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_admissions.xlsx".to_string());
    let rows: u32 = 60;

    let mut rng = SimpleRng::new(42);
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let date = Format::new().set_num_format("yyyy-mm-dd");

    let ws = workbook.add_worksheet();
    ws.set_name("Sheet1")?;

    let columns = ["PatientID", "Age", "Sex", "DiseaseName", "Treatment", "AdmissionDate"];
    for (c, name) in columns.iter().enumerate() {
        ws.write_string_with_format(0, c as u16, *name, &header)?;
    }

    // 2024-12-01 as an Excel serial date.
    let first_day = 45627.0;

    for r in 1..=rows {
        let &(disease, treatments) = rng.pick(DISEASES);
        let treatment = rng.pick(treatments);

        ws.write_number(r, 0, (10_000 + r) as f64)?;
        ws.write_number(r, 1, (18 + rng.below(70)) as f64)?;
        ws.write_string(r, 2, *rng.pick(&["F", "M"][..]))?;
        ws.write_string(r, 3, disease)?;
        ws.write_string(r, 4, *treatment)?;
        ws.write_number_with_format(r, 5, first_day + rng.below(31) as f64, &date)?;
    }

    ws.autofit();
    workbook.save(&output_path)?;

    println!("Wrote {rows} admissions to {output_path}");
    Ok(())
}
