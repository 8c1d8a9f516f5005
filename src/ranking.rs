use crate::{error::AppError, model::ClassDistribution, types::DiseaseProbability};

/// Number of diseases reported per prediction.
pub const TOP_K: usize = 3;

/// Picks the `TOP_K` most probable diseases and rescales them to sum to 1.
///
/// Ties keep the classifier's class order, so identical input always yields
/// identical output.
pub fn rank_top_k(distribution: &ClassDistribution) -> Result<Vec<DiseaseProbability>, AppError> {
    if distribution.len() < TOP_K {
        return Err(AppError::InsufficientClasses {
            found: distribution.len(),
            required: TOP_K,
        });
    }

    let mut ranked: Vec<&(String, f64)> = distribution.entries.iter().collect();
    // sort_by is stable; total_cmp orders any stray NaN deterministically
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(TOP_K);

    let total: f64 = ranked.iter().map(|(_, p)| p).sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(AppError::DegenerateDistribution);
    }

    Ok(ranked
        .into_iter()
        .map(|(disease, p)| DiseaseProbability {
            disease: disease.clone(),
            probability: round3(p / total),
        })
        .collect())
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
