use chrono::{Duration, NaiveDate, Weekday};
use storage::repository::{
    DailyHoursRepository, QuizResultRepository, QuizScheduleRepository, StreakRepository,
};
use storage::sqlite::SqliteRepository;
use tracker_core::hours::HoursEntry;
use tracker_core::model::{LessonId, QuizResult, WeekPolicy};
use tracker_core::schedule::QuizSchedule;
use tracker_core::streak::StreakState;
use tracker_core::time::fixed_now;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

#[tokio::test]
async fn sqlite_streak_state_roundtrips_with_date_keys() {
    let repo = connect("memdb_streak").await;

    assert_eq!(repo.get_streak().await.unwrap(), StreakState::default());
    assert!(repo.last_rollover().await.unwrap().is_none());

    let state = StreakState::default()
        .record_session(day(3, 7), &WeekPolicy::default())
        .state;
    repo.save_streak(&state).await.unwrap();
    repo.set_last_rollover(day(3, 6)).await.unwrap();

    let loaded = repo.get_streak().await.unwrap();
    assert_eq!(loaded, state);
    assert_eq!(loaded.last_study_date(), Some(day(3, 7)));
    assert_eq!(repo.last_rollover().await.unwrap(), Some(day(3, 6)));

    // Saving counters leaves the rollover marker alone.
    repo.save_streak(&state.reset()).await.unwrap();
    assert_eq!(repo.get_streak().await.unwrap().streak(), 0);
    assert_eq!(repo.last_rollover().await.unwrap(), Some(day(3, 6)));

    let raw: Option<String> =
        sqlx::query_scalar("SELECT last_study_date FROM streak_state WHERE id = 1")
            .fetch_one(repo.pool())
            .await
            .unwrap();
    assert_eq!(raw.as_deref(), Some("2024-03-07"));
}

#[tokio::test]
async fn sqlite_quiz_results_keep_order_and_mastery() {
    let repo = connect("memdb_quiz").await;
    let lesson = LessonId::new("chemistry-ch2").unwrap();
    let other = LessonId::new("arabic-ch1").unwrap();

    let first = QuizResult::new(8.0, 10.0, fixed_now()).unwrap();
    let second = QuizResult::new(9.5, 10.0, fixed_now() + Duration::minutes(5)).unwrap();
    repo.append_result(&lesson, &first).await.unwrap();
    repo.append_result(&lesson, &second).await.unwrap();
    // A stored mastery with no attempts behind it does not make a lesson.
    repo.save_mastery(&other, 30).await.unwrap();
    repo.save_mastery(&lesson, 17).await.unwrap();
    repo.save_mastery(&lesson, 18).await.unwrap();

    let stored = repo.list_results(&lesson).await.unwrap();
    assert_eq!(stored, vec![first, second]);
    assert_eq!(repo.get_mastery(&lesson).await.unwrap(), Some(18));
    assert_eq!(
        repo.get_mastery(&LessonId::new("missing").unwrap())
            .await
            .unwrap(),
        None
    );
    assert_eq!(repo.list_lessons().await.unwrap(), vec![lesson]);
}

#[tokio::test]
async fn sqlite_hours_and_schedule_roundtrip() {
    let repo = connect("memdb_hours_schedule").await;

    assert!(repo.get_hours(day(3, 4), "General").await.unwrap().is_none());
    let general = HoursEntry::new(day(3, 4), None).add_hour();
    let physics = HoursEntry::new(day(3, 4), Some("Physics")).add_hour();
    let previous = HoursEntry::new(day(2, 29), Some("Physics")).add_hour();
    for entry in [&general, &physics, &previous] {
        repo.save_hours(entry).await.unwrap();
    }
    let general = general.add_hour();
    repo.save_hours(&general).await.unwrap();

    assert_eq!(
        repo.get_hours(day(3, 4), "General").await.unwrap(),
        Some(general.clone())
    );
    assert_eq!(
        repo.list_hours(day(3, 1), day(3, 31)).await.unwrap(),
        vec![general, physics]
    );
    assert_eq!(repo.list_hours(day(2, 1), day(3, 31)).await.unwrap().len(), 3);

    assert!(repo.get_schedule().await.unwrap().is_none());
    let policy = WeekPolicy::default();
    let mut schedule = QuizSchedule::new(11);
    schedule.set_range(Some(2), Some(6), 11);
    schedule
        .assign(2, Weekday::Sun, "Mathematics", &policy, 11)
        .unwrap();
    schedule
        .assign(4, Weekday::Wed, "Physics", &policy, 11)
        .unwrap();
    repo.save_schedule(&schedule).await.unwrap();
    assert_eq!(repo.get_schedule().await.unwrap(), Some(schedule.clone()));

    // Saving replaces previous slots.
    schedule.assign(2, Weekday::Sun, "", &policy, 11).unwrap();
    repo.save_schedule(&schedule).await.unwrap();
    let loaded = repo.get_schedule().await.unwrap().unwrap();
    assert_eq!(loaded.slots().count(), 1);
    assert_eq!(loaded.start_week(), 2);
    assert_eq!(loaded.end_week(), 6);
}
