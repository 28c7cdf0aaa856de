use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct AnnualData {
    pub double: f64,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnnualGcmDatum {
    pub gcm: String,
    pub variable: String,
    pub from_year: String,
    pub to_year: String,
    pub annual_data: AnnualData,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename = "list")]
pub struct AnnualGcmData {
    #[serde(rename = "domain.web.AnnualGcmDatum")]
    pub results: Option<Vec<AnnualGcmDatum>>,
}

impl AnnualGcmData {
    /// Mean of the annual values over every circulation model, 0 when there are none.
    pub fn average(&self) -> f64 {
        let results = self.results.as_deref().unwrap_or_default();

        match results.len() {
            0 => 0.0,
            count => results.iter().map(|datum| datum.annual_data.double).sum::<f64>() / count as f64,
        }
    }
}
