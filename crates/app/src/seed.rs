use learn_core::model::{QuestionId, QuestionRecord, Quiz, QuizId};
use storage::repository::{QuizRepository, StorageError};

/// Demo content covering both stored question shapes and an untimed quiz.
pub async fn seed_demo(quizzes: &dyn QuizRepository) -> Result<usize, StorageError> {
    let geography = QuizId::new(1);
    let basics = QuizId::new(2);

    quizzes
        .upsert_quiz(&Quiz::new(geography, "World capitals", Some(2)))
        .await?;
    quizzes
        .upsert_quiz(&Quiz::new(basics, "Science basics (untimed)", None))
        .await?;

    let questions = [
        QuestionRecord::with_options(
            QuestionId::new(101),
            geography,
            "What is the capital of France?",
            vec!["Paris".into(), "Lyon".into(), "Marseille".into()],
            "Paris",
        ),
        QuestionRecord::with_options(
            QuestionId::new(102),
            geography,
            "What is the capital of Japan?",
            vec!["Osaka".into(), "Tokyo".into(), "Kyoto".into(), "Nagoya".into()],
            "b",
        ),
        QuestionRecord::with_fields(
            QuestionId::new(103),
            geography,
            "What is the capital of Australia?",
            [Some("Sydney"), Some("Melbourne"), Some("Canberra"), Some("Perth")],
            "C",
        ),
        QuestionRecord::with_fields(
            QuestionId::new(201),
            basics,
            "Which gas do plants absorb?",
            [Some("Oxygen"), Some("Carbon dioxide"), Some("Nitrogen"), None],
            " carbon dioxide ",
        ),
        QuestionRecord::with_options(
            QuestionId::new(202),
            basics,
            "How many legs does an insect have?",
            vec!["Four".into(), "Six".into(), "Eight".into()],
            "Six",
        ),
    ];

    for question in &questions {
        quizzes.upsert_question(question).await?;
    }

    tracing::info!("Seeded {} quizzes with {} questions", 2, questions.len());
    Ok(questions.len())
}
