use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::core::params::DatingParams;
use crate::io::trees::Provenance;

/// Build the provenance entry appended to every dated tree sequence
pub fn dating_record(params: &DatingParams) -> Provenance {
    Provenance {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        record: json!({
            "software": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "parameters": {
                "command": "date",
                "Ne": params.population_size,
                "time_grid": params.time_grid.as_str(),
                "mutation_rate": params.mutation_rate,
                "recombination_rate": params.recombination_rate,
                "slices": params.slices,
                "epsilon": params.epsilon,
            },
        }),
    }
}
