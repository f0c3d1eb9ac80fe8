use crate::domain::{ExperimentId, letter_suffix};
use crate::error::CatalogError;

/// Builds the Madrigal experiment page link, e.g.
/// `<base>experiment_list=/2023/pfa/01mar23b` for `20230301.002` on PFISR.
pub fn madrigal_link(base: &str, experiment: &str, mnemonic: &str) -> Result<String, CatalogError> {
    let id: ExperimentId = experiment
        .parse()
        .map_err(|_| CatalogError::LinkConstruction(format!("malformed experiment id {experiment}")))?;
    experiment_link(base, &id, mnemonic)
}

pub fn experiment_link(
    base: &str,
    id: &ExperimentId,
    mnemonic: &str,
) -> Result<String, CatalogError> {
    let suffix = sequence_suffix(id.sequence())?;
    let date_token = id.date().format("%d%b%y").to_string().to_lowercase();
    Ok(format!(
        "{base}experiment_list=/{year}/{mnemonic}/{date_token}{suffix}",
        year = id.year()
    ))
}

/// `1` -> `a`, `26` -> `z`, `27` -> `aa`.
pub fn sequence_suffix(sequence: u32) -> Result<String, CatalogError> {
    if sequence == 0 {
        return Err(CatalogError::LinkConstruction(
            "experiment sequence numbers start at 1".to_string(),
        ));
    }
    Ok(letter_suffix(sequence as usize - 1))
}
