use marcsim_core::Record;

use super::{CheckOutcome, Verdict, select_pair};
use crate::error::Result;

/// Records with 880 alternate-script fields are not compared reliably, so
/// either side carrying one vetoes the pair.
pub fn has880(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let fields = select_pair(&["880"], record1, record2)?;

    let verdict = if fields.iter().any(|set| !set.is_empty()) {
        Verdict::Veto
    } else {
        Verdict::Skip
    };

    Ok(CheckOutcome::new(verdict, fields.clone(), fields))
}
