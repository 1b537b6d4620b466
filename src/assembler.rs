//! Cumulative test assembly
//!
//! Each lesson gets a 50-row quiz drawn from its own words first, topped up
//! with words from earlier lessons, plus an answer key for each quiz page.
//! All randomness comes from the caller's generator, so a seeded run is
//! reproducible.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{Result, WordTestError};
use crate::model::{LessonPage, LessonTable, PageKind, RenderContext, WordPair, PAGE_SIZE};

/// Pick up to [`PAGE_SIZE`] pairs for `lesson`.
///
/// Own pairs come first; earlier lessons only fill the remaining rows, in a
/// random order. No pair is invented when both together fall short.
pub fn select_pairs<R: Rng + ?Sized>(table: &LessonTable, lesson: u32, rng: &mut R) -> Vec<WordPair> {
    let own = table.get(lesson);

    if own.len() >= PAGE_SIZE {
        let mut pool = own.to_vec();
        pool.shuffle(rng);
        pool.truncate(PAGE_SIZE);
        return pool;
    }

    let mut selected = own.to_vec();
    let needed = PAGE_SIZE - own.len();
    let mut previous = table.pairs_before(lesson);
    if !previous.is_empty() {
        previous.shuffle(rng);
        selected.extend(previous.into_iter().take(needed));
    }
    selected
}

/// `"term translation"` lines in quiz order.
pub fn answer_terms(quiz_pairs: &[WordPair]) -> Vec<String> {
    quiz_pairs
        .iter()
        .map(|p| format!("{} {}", p.term, p.translation))
        .collect()
}

/// `"translation term"` lines for the independently shuffled translation column.
///
/// Terms sharing a translation are queued in selection order and each is
/// handed out at most once, so colliding translations still get distinct
/// terms.
pub fn answer_translations(selected: &[WordPair], quiz_translations: &[String]) -> Vec<String> {
    let mut queues: HashMap<&str, VecDeque<&str>> = HashMap::new();
    for pair in selected {
        queues
            .entry(pair.translation.as_str())
            .or_default()
            .push_back(pair.term.as_str());
    }

    quiz_translations
        .iter()
        .map(|translation| {
            if translation.is_empty() {
                return String::new();
            }
            let term = queues
                .get_mut(translation.as_str())
                .and_then(VecDeque::pop_front)
                .unwrap_or("");
            format!("{} {}", translation, term)
        })
        .collect()
}

/// Build the four pages of one lesson: quiz terms, quiz translations,
/// answer terms, answer translations.
pub fn assemble_lesson<R: Rng + ?Sized>(table: &LessonTable, lesson: u32, rng: &mut R) -> [LessonPage; 4] {
    let selected = select_pairs(table, lesson, rng);

    let mut quiz_pairs = selected.clone();
    quiz_pairs.shuffle(rng);
    let quiz_terms: Vec<String> = quiz_pairs.iter().map(|p| p.term.clone()).collect();

    let mut quiz_translations: Vec<String> = quiz_pairs.iter().map(|p| p.translation.clone()).collect();
    quiz_translations.shuffle(rng);

    let key_terms = answer_terms(&quiz_pairs);
    let key_translations = answer_translations(&selected, &quiz_translations);

    debug!(
        lesson,
        own = table.get(lesson).len(),
        selected = selected.len(),
        "assembled lesson"
    );

    [
        LessonPage::new(lesson, PageKind::Quiz, quiz_terms, Vec::new(), true, false),
        LessonPage::new(lesson, PageKind::Quiz, Vec::new(), quiz_translations, false, true),
        LessonPage::new(lesson, PageKind::Answer, key_terms, Vec::new(), true, false),
        LessonPage::new(lesson, PageKind::Answer, Vec::new(), key_translations, false, true),
    ]
}

/// Build the pages for every lesson from 1 to the highest lesson number.
pub fn assemble<R: Rng + ?Sized>(table: &LessonTable, rng: &mut R) -> Result<RenderContext> {
    if table.is_empty() {
        return Err(WordTestError::NoLessonsFound {
            lessons: table.lesson_count(),
            pairs: table.pair_count(),
        });
    }

    let mut context = RenderContext::default();
    for lesson in 1..=table.max_lesson() {
        context.lessons.extend(assemble_lesson(table, lesson, rng));
    }
    Ok(context)
}

/// [`assemble`] with a generator seeded from `seed`.
pub fn assemble_seeded(table: &LessonTable, seed: u64) -> Result<RenderContext> {
    let mut rng = StdRng::seed_from_u64(seed);
    assemble(table, &mut rng)
}
