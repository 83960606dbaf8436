use csv::ReaderBuilder;
use std::error::Error;
use std::fs::File;

/// Three-component (vertical, north, east) sample columns sharing one
/// timestamp column, as produced by the fixture exporter.
#[derive(Debug, Clone)]
pub struct Traces {
    pub timestamp: Vec<i64>,
    pub z: Vec<f64>,
    pub n: Vec<f64>,
    pub e: Vec<f64>,
}

impl Traces {
    pub fn new(timestamp: Vec<i64>, z: Vec<f64>, n: Vec<f64>, e: Vec<f64>) -> Self {
        Traces { timestamp, z, n, e }
    }

    pub fn n_samples(&self) -> usize {
        self.z.len()
    }

    pub fn get_timestamp(&self) -> Result<&[i64], Box<dyn Error>> {
        Ok(&self.timestamp)
    }

    pub fn select_component(&self, component: &str) -> Result<&[f64], Box<dyn Error>> {
        match component.to_lowercase().as_str() {
            "z" => Ok(&self.z),
            "n" => Ok(&self.n),
            "e" => Ok(&self.e),
            _ => Err(format!("Invalid component: {}", component).into()),
        }
    }

    /// Row-major `3 x n_samples` matrix (Z, N, E order) for batch calls.
    pub fn component_matrix(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(3 * self.n_samples());
        flat.extend_from_slice(&self.z);
        flat.extend_from_slice(&self.n);
        flat.extend_from_slice(&self.e);
        flat
    }
}

/// Infallible component lookup for the input-carrier enum; unknown names
/// fall back to the vertical component.
pub fn component_slice<'a>(traces: &'a Traces, component: &str) -> &'a [f64] {
    match component.to_lowercase().as_str() {
        "n" => &traces.n,
        "e" => &traces.e,
        _ => &traces.z,
    }
}

pub fn read_traces_from_csv(file_path: &str) -> Result<Traces, Box<dyn Error>> {
    let file = File::open(file_path)?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut timestamp = Vec::new();
    let mut z = Vec::new();
    let mut n = Vec::new();
    let mut e = Vec::new();

    for result in rdr.records() {
        let record = result?;
        timestamp.push(record[0].parse::<i64>()?);
        z.push(record[1].parse::<f64>()?);
        n.push(record[2].parse::<f64>()?);
        e.push(record[3].parse::<f64>()?);
    }

    Ok(Traces::new(timestamp, z, n, e))
}
