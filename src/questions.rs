use crate::symptoms::display_normalize;
use rand::{seq::SliceRandom, Rng};
use std::collections::BTreeMap;

pub const QUESTIONS_PER_SYMPTOM: usize = 3;

const TEMPLATES: &[&str] = &[
    "On a scale of 1-5, how severe is your {symptom}?",
    "How frequently are you experiencing {symptom}?",
    "How long have you been noticing {symptom}?",
    "Does anything make your {symptom} better or worse?",
    "Is your {symptom} getting better, worse, or staying the same?",
];

/// Follow-up questions keyed by the display form of each symptom.
pub fn generate_questions<'a, R>(
    symptoms: impl IntoIterator<Item = &'a str>,
    rng: &mut R,
) -> BTreeMap<String, Vec<String>>
where
    R: Rng + ?Sized,
{
    symptoms
        .into_iter()
        .map(|raw| {
            let symptom = display_normalize(raw);
            let questions = questions_for(&symptom, rng);
            (symptom, questions)
        })
        .collect()
}

fn questions_for<R: Rng + ?Sized>(symptom: &str, rng: &mut R) -> Vec<String> {
    TEMPLATES
        .choose_multiple(rng, QUESTIONS_PER_SYMPTOM)
        .map(|template| template.replace("{symptom}", symptom))
        .collect()
}
