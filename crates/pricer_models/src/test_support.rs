//! Deterministic noise source for unit tests.

use std::cell::Cell;
use std::rc::Rc;

use pricer_core::math::Matrix;
use pricer_core::traits::NoiseSource;
use pricer_core::types::{SimDate, SimulationError};

/// Returns the same fixed rows at every date and counts calls.
pub(crate) struct FixedNoise {
    ids: Vec<String>,
    rows: Vec<Vec<f64>>,
    calls: Cell<usize>,
}

impl FixedNoise {
    pub(crate) fn new(entries: &[(&str, Vec<f64>)]) -> Rc<Self> {
        Rc::new(Self {
            ids: entries.iter().map(|(id, _)| id.to_string()).collect(),
            rows: entries.iter().map(|(_, row)| row.clone()).collect(),
            calls: Cell::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl NoiseSource for FixedNoise {
    fn n_sims(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    fn noise_ids(&self) -> &[String] {
        &self.ids
    }

    fn noises(&self, _date: SimDate, ids: &[String]) -> Result<Rc<Matrix>, SimulationError> {
        self.calls.set(self.calls.get() + 1);
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            let index = self
                .ids
                .iter()
                .position(|known| known == id)
                .ok_or_else(|| SimulationError::UnknownNoise(id.clone()))?;
            rows.push(self.rows[index].clone());
        }
        Ok(Rc::new(Matrix::from_rows(rows)?))
    }
}

pub(crate) fn date(years: f64) -> SimDate {
    SimDate::new(years).unwrap()
}
