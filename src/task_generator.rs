use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    error::QuizError,
    words::{WordPair, WordSource},
};

/// One displayed pairing plus whether the translation really belongs to the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptTask {
    pub source: String,
    pub translation: String,
    pub is_correct: bool,
}

impl AttemptTask {
    pub fn new(source: impl Into<String>, translation: impl Into<String>, is_correct: bool) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            is_correct,
        }
    }
}

/// Build a shuffled task list from `pairs`.
///
/// The first `floor(len * correct_fraction)` shuffled pairs become correct tasks. Every
/// other pair shows its source with the translation of the pair shuffled right before it;
/// the first pair borrows from the last one when it has to be incorrect. The result is
/// shuffled again so correct and incorrect tasks interleave.
pub fn generate<R: Rng + ?Sized>(
    pairs: &[WordPair],
    correct_fraction: f64,
    rng: &mut R,
) -> Vec<AttemptTask> {
    if pairs.is_empty() {
        return Vec::new();
    }

    let mut shuffled = pairs.to_vec();
    shuffled.shuffle(rng);

    let len = shuffled.len();
    let correct_count = ((len as f64 * correct_fraction.clamp(0.0, 1.0)).floor() as usize).min(len);

    let mut tasks: Vec<AttemptTask> = shuffled
        .iter()
        .enumerate()
        .map(|(idx, pair)| {
            if idx < correct_count {
                AttemptTask::new(&pair.source_text, &pair.target_text, true)
            } else {
                let prev = &shuffled[(idx + len - 1) % len];
                AttemptTask::new(&pair.source_text, &prev.target_text, false)
            }
        })
        .collect();

    tasks.shuffle(rng);
    tasks
}

/// Loads word pairs and turns them into attempt tasks
pub struct TaskGenerator {
    source: Box<dyn WordSource>,
    correct_fraction: f64,
    rng: StdRng,
}

impl TaskGenerator {
    pub fn new(source: Box<dyn WordSource>, correct_fraction: f64) -> Self {
        Self {
            source,
            correct_fraction,
            rng: StdRng::from_entropy(),
        }
    }

    /// Same as `new` but with a reproducible shuffle
    pub fn with_seed(source: Box<dyn WordSource>, correct_fraction: f64, seed: u64) -> Self {
        Self {
            source,
            correct_fraction,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> Result<Vec<AttemptTask>, QuizError> {
        let pairs = self.source.load()?;
        Ok(generate(&pairs, self.correct_fraction, &mut self.rng))
    }

    /// Like `generate`, but an unreadable source yields no tasks instead of an error.
    pub fn fetch(&mut self) -> Vec<AttemptTask> {
        match self.generate() {
            Ok(tasks) => {
                log::debug!("generated {} attempt tasks", tasks.len());
                tasks
            }
            Err(err) => {
                log::warn!("{err}");
                Vec::new()
            }
        }
    }
}
