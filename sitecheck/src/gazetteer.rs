//! Offline address lookup from a local list of places.

use anyhow::Result;
use orography::{Candidate, Geocoder};
use serde::Deserialize;
use std::{convert::Infallible, fs::File, future::Future, io::BufReader, path::Path};

#[derive(Debug, Clone, Deserialize)]
struct Place {
    name: String,
    lat: f64,
    lon: f64,
}

/// Places matched by case-insensitive substring of their name.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: Vec<Place>,
}

impl Gazetteer {
    pub fn open(maybe_path: Option<&Path>) -> Result<Self> {
        match maybe_path {
            None => Ok(Self::default()),
            Some(path) => {
                let file = BufReader::new(File::open(path)?);
                let places: Vec<Place> = serde_json::from_reader(file)?;
                log::debug!("loaded {} places from {}", places.len(), path.display());
                Ok(Self { places })
            }
        }
    }

    fn lookup(&self, query: &str) -> Vec<Candidate> {
        let query = query.to_lowercase();
        self.places
            .iter()
            .filter(|place| place.name.to_lowercase().contains(&query))
            .map(|place| Candidate {
                lat: place.lat.to_string(),
                lon: place.lon.to_string(),
                display_name: Some(place.name.clone()),
            })
            .collect()
    }
}

impl Geocoder for Gazetteer {
    type Error = Infallible;

    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send {
        let candidates = self.lookup(query);
        async move { Ok(candidates) }
    }
}
