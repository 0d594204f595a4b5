//! Vote toggle and bookmark integration tests

mod common;

use futures::future::join_all;
use heapharbor_core::db::{AnswerRepo, SavedRepo, VoteRepo};
use heapharbor_core::models::{
    Direction, PostContent, QuestionId, SaveOutcome, ToggleOutcome, UserId, VoteState, VoteTarget,
};
use heapharbor_core::{DbError, ErrorKind};

async fn question_edges(pool: &sqlx::PgPool, user: UserId, question: QuestionId) -> (i64, i64) {
    let up: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM questions_upvotes WHERE user_id = $1 AND question_id = $2",
    )
    .bind(user)
    .bind(question)
    .fetch_one(pool)
    .await
    .unwrap();
    let down: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM questions_downvotes WHERE user_id = $1 AND question_id = $2",
    )
    .bind(user)
    .bind(question)
    .fetch_one(pool)
    .await
    .unwrap();
    (up, down)
}

#[tokio::test]
#[ignore = "requires database"]
async fn up_then_down_then_down_walks_through_every_outcome() {
    let store = common::store().await;
    let author = common::user(&store).await;
    let voter = common::user(&store).await;
    let q = common::question(&store, author, &[]).await;
    let target = VoteTarget::Question(q.id);
    let votes = VoteRepo::new(&store);

    let r = votes.upvote(voter, target).await.unwrap();
    assert_eq!(r.outcome, ToggleOutcome::Cast);
    assert_eq!(question_edges(store.pool(), voter, q.id).await, (1, 0));

    let r = votes.downvote(voter, target).await.unwrap();
    assert_eq!(r.outcome, ToggleOutcome::Flipped);
    assert_eq!(question_edges(store.pool(), voter, q.id).await, (0, 1));

    let r = votes.downvote(voter, target).await.unwrap();
    assert_eq!(r.outcome, ToggleOutcome::Retracted);
    assert_eq!(r.state, VoteState::default());
    assert_eq!(question_edges(store.pool(), voter, q.id).await, (0, 0));
}

#[tokio::test]
#[ignore = "requires database"]
async fn answer_votes_use_their_own_edges() {
    let store = common::store().await;
    let author = common::user(&store).await;
    let voter = common::user(&store).await;
    let q = common::question(&store, author, &[]).await;
    let answer = AnswerRepo::new(&store)
        .create(q.id, author, &PostContent::new("Use a join table").unwrap())
        .await
        .unwrap();

    let votes = VoteRepo::new(&store);
    let target = VoteTarget::Answer(answer.id);
    votes.downvote(voter, target).await.unwrap();

    let state = votes.state(voter, target).await.unwrap();
    assert_eq!(state.current(), Some(Direction::Down));

    // The question itself is untouched
    assert_eq!(question_edges(store.pool(), voter, q.id).await, (0, 0));
    let answer_downs = common::count(
        store.pool(),
        "SELECT COUNT(*) FROM answers_downvotes WHERE answer_id = $1",
        answer.id.get(),
    )
    .await;
    assert_eq!(answer_downs, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn double_toggle_restores_no_vote() {
    let store = common::store().await;
    let author = common::user(&store).await;
    let q = common::question(&store, author, &[]).await;
    let votes = VoteRepo::new(&store);
    let target = VoteTarget::Question(q.id);

    for direction in [Direction::Up, Direction::Down] {
        votes.toggle(author, target, direction).await.unwrap();
        let r = votes.toggle(author, target, direction).await.unwrap();
        assert_eq!(r.outcome, ToggleOutcome::Retracted);
        assert_eq!(votes.state(author, target).await.unwrap(), VoteState::default());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires database"]
async fn concurrent_toggles_never_leave_both_edges() {
    let store = common::store().await;
    let author = common::user(&store).await;
    let voter = common::user(&store).await;
    let q = common::question(&store, author, &[]).await;
    let target = VoteTarget::Question(q.id);

    let tasks = (0..16).map(|i| {
        let store = store.clone();
        let direction = if i % 2 == 0 { Direction::Up } else { Direction::Down };
        tokio::spawn(async move { VoteRepo::new(&store).toggle(voter, target, direction).await })
    });

    for joined in join_all(tasks).await {
        joined.expect("task panicked").expect("toggle failed");
    }

    let (up, down) = question_edges(store.pool(), voter, q.id).await;
    assert!(up + down <= 1, "up={up} down={down}");
}

#[tokio::test]
#[ignore = "requires database"]
async fn toggle_on_missing_target_is_not_found() {
    let store = common::store().await;
    let voter = common::user(&store).await;
    let votes = VoteRepo::new(&store);

    let err = votes
        .upvote(voter, VoteTarget::Question(QuestionId(i64::MAX)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = votes
        .downvote(voter, VoteTarget::Answer(heapharbor_core::models::AnswerId(i64::MAX)))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "answer", .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn toggle_by_missing_user_is_not_found() {
    let store = common::store().await;
    let author = common::user(&store).await;
    let q = common::question(&store, author, &[]).await;

    let err = VoteRepo::new(&store)
        .upvote(UserId(i64::MAX), VoteTarget::Question(q.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "user", .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn save_toggles_bookmark() {
    let store = common::store().await;
    let author = common::user(&store).await;
    let reader = common::user(&store).await;
    let q = common::question(&store, author, &[]).await;
    let saved = SavedRepo::new(&store);

    assert_eq!(saved.toggle(reader, q.id).await.unwrap().outcome, SaveOutcome::Saved);
    assert_eq!(saved.toggle(reader, q.id).await.unwrap().outcome, SaveOutcome::Unsaved);

    let rows = common::count(
        store.pool(),
        "SELECT COUNT(*) FROM users_saved_questions WHERE question_id = $1",
        q.id.get(),
    )
    .await;
    assert_eq!(rows, 0);

    let err = saved.toggle(reader, QuestionId(i64::MAX)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
