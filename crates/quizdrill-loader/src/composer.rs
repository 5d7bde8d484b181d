//! Quiz composition from the catalogue.
//!
//! Turns manifest entries into runnable quizzes: module quizzes play their
//! document as-is, checkpoints and final exams pool questions from a module
//! range when their own document carries none, and custom quizzes pool from a
//! hand-picked module selection.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use uuid::Uuid;

use quizdrill_core::model::{
    CheckpointEntry, ExamEntry, Manifest, ModuleEntry, Question, Quiz, QuizKind,
    DEFAULT_CUSTOM_COUNT, DEFAULT_CUSTOM_TITLE, DEFAULT_PASS_PERCENT, FINAL_EXAM_MINUTES,
    POOLED_QUESTION_CAP,
};

use crate::batch::{load_pool, DEFAULT_BATCH_SIZE};
use crate::error::LoadError;
use crate::fetcher::Fetcher;

/// Knobs for pooled composition.
#[derive(Debug, Clone)]
pub struct ComposeSettings {
    /// Documents fetched concurrently per batch window.
    pub batch_size: usize,
    /// Question cap on pooled quizzes.
    pub pooled_cap: usize,
    /// Time limit (minutes) stamped on final exams without one of their own.
    pub final_exam_minutes: u32,
    /// Question count for custom quizzes when the caller does not pick one.
    pub custom_count: usize,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            pooled_cap: POOLED_QUESTION_CAP,
            final_exam_minutes: FINAL_EXAM_MINUTES,
            custom_count: DEFAULT_CUSTOM_COUNT,
        }
    }
}

/// Composes runnable quizzes out of manifest entries and their documents.
pub struct Composer {
    manifest: Manifest,
    fetcher: Fetcher,
    settings: ComposeSettings,
    seed: Option<u64>,
}

impl Composer {
    pub fn new(manifest: Manifest, fetcher: Fetcher) -> Self {
        Self {
            manifest,
            fetcher,
            settings: ComposeSettings::default(),
            seed: None,
        }
    }

    pub fn with_settings(mut self, settings: ComposeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Shuffle deterministically from `seed` instead of from entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// A module quiz plays its document as-is, in document order.
    #[instrument(skip(self, cancel), fields(id = %module.id))]
    pub async fn module_quiz(
        &self,
        module: &ModuleEntry,
        cancel: &CancellationToken,
    ) -> Result<Quiz, LoadError> {
        let set = self.fetcher.fetch(&module.file, cancel).await?;
        info!(questions = set.questions.len(), "composed module quiz");

        Ok(Quiz {
            id: module.id.clone(),
            title: set.title,
            kind: QuizKind::Module,
            questions: set.questions,
            pass_percentage: set.pass_percentage.unwrap_or(DEFAULT_PASS_PERCENT),
            time_limit: set.time_limit,
            created_from: None,
            created_at: None,
        })
    }

    /// A checkpoint plays its own questions when its document has any, and
    /// otherwise pools from the checkpoint's module range.
    #[instrument(skip(self, cancel), fields(id = %checkpoint.id))]
    pub async fn checkpoint_quiz(
        &self,
        checkpoint: &CheckpointEntry,
        cancel: &CancellationToken,
    ) -> Result<Quiz, LoadError> {
        let set = self.fetcher.fetch(&checkpoint.file, cancel).await?;

        let questions = if set.questions.is_empty() {
            let [lo, hi] = checkpoint.module_range;
            self.pooled_questions(lo, hi, cancel).await?
        } else {
            set.questions
        };
        info!(questions = questions.len(), "composed checkpoint quiz");

        Ok(Quiz {
            id: checkpoint.id.clone(),
            title: set.title,
            kind: QuizKind::Checkpoint,
            questions,
            pass_percentage: set.pass_percentage.unwrap_or(DEFAULT_PASS_PERCENT),
            time_limit: set.time_limit,
            created_from: None,
            created_at: None,
        })
    }

    /// A final exam pools from the full module-number span of the catalogue
    /// when its document is empty, and always gets a time limit.
    #[instrument(skip(self, cancel), fields(id = %exam.id))]
    pub async fn final_exam_quiz(
        &self,
        exam: &ExamEntry,
        cancel: &CancellationToken,
    ) -> Result<Quiz, LoadError> {
        let set = self.fetcher.fetch(&exam.file, cancel).await?;

        let questions = if set.questions.is_empty() {
            match self.manifest.module_span() {
                Some([lo, hi]) => self.pooled_questions(lo, hi, cancel).await?,
                None => Vec::new(),
            }
        } else {
            set.questions
        };
        info!(questions = questions.len(), "composed final exam");

        Ok(Quiz {
            id: exam.id.clone(),
            title: set.title,
            kind: QuizKind::FinalExam,
            questions,
            pass_percentage: set.pass_percentage.unwrap_or(DEFAULT_PASS_PERCENT),
            time_limit: set.time_limit.or(Some(self.settings.final_exam_minutes)),
            created_from: None,
            created_at: None,
        })
    }

    /// A custom quiz pools from a hand-picked module selection.
    ///
    /// `count` and `title` fall back to the configured defaults. The quiz id
    /// is freshly generated, and the selection is recorded on the quiz.
    #[instrument(skip(self, cancel), fields(modules = modules.len()))]
    pub async fn custom_quiz(
        &self,
        modules: &[&ModuleEntry],
        count: Option<usize>,
        title: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<Quiz, LoadError> {
        if modules.is_empty() {
            return Err(LoadError::EmptySelection);
        }

        let files: Vec<String> = modules.iter().map(|m| m.file.clone()).collect();
        let mut pool = load_pool(&self.fetcher, &files, self.settings.batch_size, cancel).await?;
        self.shuffle(&mut pool);
        pool.truncate(count.unwrap_or(self.settings.custom_count));
        info!(questions = pool.len(), "composed custom quiz");

        Ok(Quiz {
            id: format!("custom-{}", Uuid::new_v4()),
            title: title.unwrap_or_else(|| DEFAULT_CUSTOM_TITLE.to_string()),
            kind: QuizKind::Custom,
            questions: pool,
            pass_percentage: DEFAULT_PASS_PERCENT,
            time_limit: None,
            created_from: Some(modules.iter().map(|m| m.id.clone()).collect()),
            created_at: Some(chrono::Utc::now()),
        })
    }

    /// Pool, shuffle and cap the questions of every module numbered within
    /// the inclusive `[lo, hi]` range.
    async fn pooled_questions(
        &self,
        lo: u32,
        hi: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Question>, LoadError> {
        let files: Vec<String> = self
            .manifest
            .modules_in_range(lo, hi)
            .iter()
            .map(|m| m.file.clone())
            .collect();

        let mut pool = load_pool(&self.fetcher, &files, self.settings.batch_size, cancel).await?;
        self.shuffle(&mut pool);
        pool.truncate(self.settings.pooled_cap);
        Ok(pool)
    }

    fn shuffle(&self, questions: &mut [Question]) {
        match self.seed {
            Some(seed) => questions.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => questions.shuffle(&mut rand::thread_rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quizdrill_core::model::{Choice, QuestionKind, QuestionSet};

    use crate::cache::DocumentCache;
    use crate::mock::MockSource;

    fn module(id: &str, number: u32) -> ModuleEntry {
        ModuleEntry {
            id: id.to_string(),
            title: format!("Module {number}"),
            file: format!("{id}.json"),
            module_number: number,
        }
    }

    fn checkpoint(id: &str, lo: u32, hi: u32) -> CheckpointEntry {
        CheckpointEntry {
            id: id.to_string(),
            title: format!("Checkpoint {lo}-{hi}"),
            file: format!("{id}.json"),
            module_range: [lo, hi],
        }
    }

    fn exam(id: &str) -> ExamEntry {
        ExamEntry {
            id: id.to_string(),
            title: "Final Exam".to_string(),
            file: format!("{id}.json"),
            description: None,
        }
    }

    fn set_with(title: &str, prefix: &str, questions: usize) -> QuestionSet {
        QuestionSet {
            title: title.to_string(),
            pass_percentage: None,
            time_limit: None,
            questions: (0..questions)
                .map(|i| Question {
                    prompt: format!("{prefix}-{i}"),
                    image: None,
                    explanation: None,
                    kind: QuestionKind::Single {
                        options: vec![Choice {
                            text: "a".into(),
                            is_correct: true,
                        }],
                    },
                })
                .collect(),
        }
    }

    fn composer(source: MockSource, manifest: Manifest) -> Composer {
        let fetcher = Fetcher::new(Arc::new(source), DocumentCache::new());
        Composer::new(manifest, fetcher).with_seed(7)
    }

    fn prompts(quiz: &Quiz) -> Vec<String> {
        quiz.questions.iter().map(|q| q.prompt.clone()).collect()
    }

    #[tokio::test]
    async fn module_quiz_plays_the_document_as_is() {
        let mut set = set_with("Routing", "m1", 3);
        set.pass_percentage = Some(80);
        set.time_limit = Some(10);

        let source = MockSource::new().with_document("m1.json", set);
        let manifest = Manifest {
            modules: vec![module("m1", 1)],
            checkpoints: vec![],
            final_exams: vec![],
        };

        let composer = composer(source, manifest);
        let entry = composer.manifest().module("m1").unwrap().clone();
        let quiz = composer
            .module_quiz(&entry, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(quiz.id, "m1");
        assert_eq!(quiz.kind, QuizKind::Module);
        assert_eq!(quiz.title, "Routing");
        assert_eq!(quiz.pass_percentage, 80);
        assert_eq!(quiz.time_limit, Some(10));
        assert_eq!(prompts(&quiz), vec!["m1-0", "m1-1", "m1-2"]);
    }

    #[tokio::test]
    async fn module_quiz_defaults_the_pass_mark() {
        let source = MockSource::new().with_document("m1.json", set_with("Routing", "m1", 1));
        let manifest = Manifest {
            modules: vec![module("m1", 1)],
            checkpoints: vec![],
            final_exams: vec![],
        };

        let composer = composer(source, manifest);
        let entry = composer.manifest().module("m1").unwrap().clone();
        let quiz = composer
            .module_quiz(&entry, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(quiz.pass_percentage, DEFAULT_PASS_PERCENT);
    }

    #[tokio::test]
    async fn checkpoint_pools_when_its_document_is_empty() {
        let source = MockSource::new()
            .with_document("m1.json", set_with("One", "m1", 3))
            .with_document("m2.json", set_with("Two", "m2", 3))
            .with_document("m3.json", set_with("Three", "m3", 3))
            .with_document("cp1.json", set_with("Checkpoint 1-2", "cp", 0));
        let manifest = Manifest {
            modules: vec![module("m1", 1), module("m2", 2), module("m3", 3)],
            checkpoints: vec![checkpoint("cp1", 1, 2)],
            final_exams: vec![],
        };

        let composer = composer(source, manifest);
        let entry = composer.manifest().checkpoint("cp1").unwrap().clone();
        let quiz = composer
            .checkpoint_quiz(&entry, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(quiz.kind, QuizKind::Checkpoint);
        assert_eq!(quiz.title, "Checkpoint 1-2");
        assert_eq!(quiz.len(), 6);

        let mut got = prompts(&quiz);
        got.sort();
        assert_eq!(got, vec!["m1-0", "m1-1", "m1-2", "m2-0", "m2-1", "m2-2"]);
    }

    #[tokio::test]
    async fn checkpoint_keeps_inline_questions() {
        let source = MockSource::new()
            .with_document("m1.json", set_with("One", "m1", 3))
            .with_document("cp1.json", set_with("Checkpoint", "cp", 2));
        let manifest = Manifest {
            modules: vec![module("m1", 1)],
            checkpoints: vec![checkpoint("cp1", 1, 1)],
            final_exams: vec![],
        };

        let fetcher_source = Arc::new(source);
        let fetcher = Fetcher::new(fetcher_source.clone(), DocumentCache::new());
        let composer = Composer::new(manifest, fetcher).with_seed(7);

        let entry = composer.manifest().checkpoint("cp1").unwrap().clone();
        let quiz = composer
            .checkpoint_quiz(&entry, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(prompts(&quiz), vec!["cp-0", "cp-1"]);
        assert_eq!(fetcher_source.fetch_count("m1.json"), 0);
    }

    #[tokio::test]
    async fn pooled_quizzes_cap_their_size() {
        let source = MockSource::new()
            .with_document("m1.json", set_with("One", "m1", 3))
            .with_document("m2.json", set_with("Two", "m2", 3))
            .with_document("cp1.json", set_with("Checkpoint", "cp", 0));
        let manifest = Manifest {
            modules: vec![module("m1", 1), module("m2", 2)],
            checkpoints: vec![checkpoint("cp1", 1, 2)],
            final_exams: vec![],
        };

        let composer = composer(source, manifest).with_settings(ComposeSettings {
            pooled_cap: 4,
            ..ComposeSettings::default()
        });

        let entry = composer.manifest().checkpoint("cp1").unwrap().clone();
        let quiz = composer
            .checkpoint_quiz(&entry, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(quiz.len(), 4);
    }

    #[tokio::test]
    async fn final_exam_pools_the_whole_catalogue() {
        let source = MockSource::new()
            .with_document("m1.json", set_with("One", "m1", 2))
            .with_document("m2.json", set_with("Two", "m2", 2))
            .with_document("m3.json", set_with("Three", "m3", 2))
            .with_document("final-a.json", set_with("Final Exam", "fe", 0));
        let manifest = Manifest {
            modules: vec![module("m1", 1), module("m2", 2), module("m3", 3)],
            checkpoints: vec![],
            final_exams: vec![exam("final-a")],
        };

        let composer = composer(source, manifest);
        let entry = composer.manifest().final_exam("final-a").unwrap().clone();
        let quiz = composer
            .final_exam_quiz(&entry, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(quiz.kind, QuizKind::FinalExam);
        assert_eq!(quiz.len(), 6);
        assert_eq!(quiz.time_limit, Some(FINAL_EXAM_MINUTES));
    }

    #[tokio::test]
    async fn final_exam_keeps_its_documents_time_limit() {
        let mut set = set_with("Final Exam", "fe", 2);
        set.time_limit = Some(90);

        let source = MockSource::new().with_document("final-a.json", set);
        let manifest = Manifest {
            modules: vec![],
            checkpoints: vec![],
            final_exams: vec![exam("final-a")],
        };

        let composer = composer(source, manifest);
        let entry = composer.manifest().final_exam("final-a").unwrap().clone();
        let quiz = composer
            .final_exam_quiz(&entry, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(quiz.time_limit, Some(90));
        assert_eq!(quiz.len(), 2);
    }

    #[tokio::test]
    async fn custom_quiz_rejects_an_empty_selection() {
        let source = MockSource::new();
        let manifest = Manifest {
            modules: vec![],
            checkpoints: vec![],
            final_exams: vec![],
        };

        let composer = composer(source, manifest);
        let err = composer
            .custom_quiz(&[], None, None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, LoadError::EmptySelection));
    }

    #[tokio::test]
    async fn custom_quiz_pools_caps_and_stamps() {
        let source = MockSource::new()
            .with_document("m1.json", set_with("One", "m1", 15))
            .with_document("m3.json", set_with("Three", "m3", 10));
        let manifest = Manifest {
            modules: vec![module("m1", 1), module("m2", 2), module("m3", 3)],
            checkpoints: vec![],
            final_exams: vec![],
        };

        let composer = composer(source, manifest);
        let m1 = composer.manifest().module("m1").unwrap().clone();
        let m3 = composer.manifest().module("m3").unwrap().clone();
        let quiz = composer
            .custom_quiz(&[&m1, &m3], None, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(quiz.kind, QuizKind::Custom);
        assert_eq!(quiz.len(), DEFAULT_CUSTOM_COUNT);
        assert_eq!(quiz.title, DEFAULT_CUSTOM_TITLE);
        assert_eq!(quiz.pass_percentage, DEFAULT_PASS_PERCENT);
        assert!(quiz.id.starts_with("custom-"));
        assert_eq!(
            quiz.created_from,
            Some(vec!["m1".to_string(), "m3".to_string()])
        );
        assert!(quiz.created_at.is_some());
    }

    #[tokio::test]
    async fn custom_quiz_honours_count_and_title() {
        let source = MockSource::new().with_document("m1.json", set_with("One", "m1", 8));
        let manifest = Manifest {
            modules: vec![module("m1", 1)],
            checkpoints: vec![],
            final_exams: vec![],
        };

        let composer = composer(source, manifest);
        let m1 = composer.manifest().module("m1").unwrap().clone();
        let quiz = composer
            .custom_quiz(
                &[&m1],
                Some(5),
                Some("Routing drill".to_string()),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(quiz.len(), 5);
        assert_eq!(quiz.title, "Routing drill");
    }

    #[tokio::test]
    async fn seeded_shuffles_are_reproducible() {
        let manifest = Manifest {
            modules: vec![module("m1", 1), module("m2", 2)],
            checkpoints: vec![checkpoint("cp1", 1, 2)],
            final_exams: vec![],
        };

        let mut orders = Vec::new();
        for _ in 0..2 {
            let source = MockSource::new()
                .with_document("m1.json", set_with("One", "m1", 5))
                .with_document("m2.json", set_with("Two", "m2", 5))
                .with_document("cp1.json", set_with("Checkpoint", "cp", 0));
            let composer = composer(source, manifest.clone());
            let entry = composer.manifest().checkpoint("cp1").unwrap().clone();
            let quiz = composer
                .checkpoint_quiz(&entry, &CancellationToken::new())
                .await
                .unwrap();
            orders.push(prompts(&quiz));
        }

        assert_eq!(orders[0], orders[1]);
    }
}
