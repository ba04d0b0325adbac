use chrono::Duration;
use learn_core::model::{
    HAS_SEEN_ONBOARDING_KEY, QuestionId, QuestionRecord, Quiz, QuizId, QuizResult, Score, UserId,
};
use learn_core::time::fixed_now;
use storage::repository::{
    AuthGateway, FlagStore, QuizRepository, ResultRepository, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrips_both_question_shapes() {
    let repo = repo("memdb_questions").await;
    let quiz = Quiz::new(QuizId::new(1), "Geography", Some(5));
    repo.upsert_quiz(&quiz).await.unwrap();

    let array = QuestionRecord::with_options(
        QuestionId::new(10),
        quiz.id,
        "Capital of the UK?",
        vec!["Paris".into(), "London".into()],
        "London",
    );
    let fields = QuestionRecord::with_fields(
        QuestionId::new(11),
        quiz.id,
        "Capital of France?",
        [Some("Paris"), Some("Rome"), None, None],
        "a",
    );
    repo.upsert_question(&array).await.unwrap();
    repo.upsert_question(&fields).await.unwrap();

    let fetched_quiz = repo.get_quiz(quiz.id).await.unwrap().expect("quiz");
    assert_eq!(fetched_quiz, quiz);

    let rows = repo.list_questions(quiz.id).await.unwrap();
    assert_eq!(rows, vec![array, fields]);
    let correct: Vec<char> = rows
        .iter()
        .map(|r| r.normalize().unwrap().correct().unwrap().as_char())
        .collect();
    assert_eq!(correct, vec!['B', 'A']);
}

#[tokio::test]
async fn sqlite_missing_quiz_is_none() {
    let repo = repo("memdb_missing").await;
    assert!(repo.get_quiz(QuizId::new(404)).await.unwrap().is_none());
    assert!(repo.list_questions(QuizId::new(404)).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_question_requires_existing_quiz() {
    let repo = repo("memdb_fk").await;
    let orphan = QuestionRecord::with_options(
        QuestionId::new(1),
        QuizId::new(99),
        "Orphan",
        vec!["x".into()],
        "A",
    );
    let err = repo.upsert_question(&orphan).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_results_are_listed_newest_first() {
    let repo = repo("memdb_results").await;
    let user = UserId::random();
    for (minutes, score, time_taken) in [(0, 40_i64, Some(30)), (10, 100, None)] {
        let result = QuizResult {
            user_id: user,
            quiz_id: QuizId::new(1),
            score: Score::try_from(score).unwrap(),
            time_taken_seconds: time_taken,
            completed_at: fixed_now() + Duration::minutes(minutes),
        };
        repo.insert_result(&result).await.unwrap();
    }

    let rows = repo.list_results(user, 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].result.score, Score::PERFECT);
    assert_eq!(rows[0].result.time_taken_seconds, None);
    assert_eq!(rows[1].result.time_taken_seconds, Some(30));
    assert_eq!(rows[1].result.completed_at, fixed_now());

    assert!(repo.list_results(UserId::random(), 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_flags_and_auth_session_persist() {
    let repo = repo("memdb_flags").await;
    assert_eq!(repo.get_flag(HAS_SEEN_ONBOARDING_KEY).await.unwrap(), None);
    repo.set_flag(HAS_SEEN_ONBOARDING_KEY, true).await.unwrap();
    repo.set_flag(HAS_SEEN_ONBOARDING_KEY, false).await.unwrap();
    assert_eq!(
        repo.get_flag(HAS_SEEN_ONBOARDING_KEY).await.unwrap(),
        Some(false)
    );

    let user = UserId::random();
    repo.sign_in(user).await.unwrap();
    assert_eq!(repo.current_user().await.unwrap(), Some(user));
    repo.sign_out().await.unwrap();
    assert_eq!(repo.current_user().await.unwrap(), None);
}
