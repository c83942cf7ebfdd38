// src/services/clock.rs

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

/// Relógio compartilhado pelos filtros de período e pelo quadro.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> NaiveDateTime + Send + Sync>);

impl Clock {
    pub fn system() -> Self {
        Self(Arc::new(|| Local::now().naive_local()))
    }

    pub fn fixed(at: NaiveDateTime) -> Self {
        Self(Arc::new(move || at))
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}
