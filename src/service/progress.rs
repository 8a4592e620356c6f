//! Lesson watch signals in, course completion aggregate out.
//!
//! The aggregate on `enrollments` is never maintained incrementally. Every write
//! to `lesson_progress` is followed by a full recompute which is idempotent and
//! converges, so a failed or raced recompute is repaired by the next one.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::log_error,
    model::{
        CrudRepository, ModelManager, ResourceTyped,
        entity::{
            Certificate, Enrollment, Lesson, LessonProgress, LessonProgressUpsert, ProgressSnapshot,
        },
    },
    service::{
        access::{self, Participation},
        certificate,
        error::{ServiceError, ServiceResult},
    },
    web::AuthenticatedUser,
};

/// `round(100 * part / whole)` with halves rounded up, `0` when `whole` is not positive.
pub fn percent_of(part: i64, whole: i64) -> i32 {
    if whole <= 0 {
        return 0;
    }
    let part = part.clamp(0, whole);
    ((200 * part + whole) / (2 * whole)) as i32
}

/// Watch percentage as stored: rounded and clamped to `0..=100`.
pub fn normalize_watch_percent(percent: f64) -> i32 {
    if percent.is_nan() {
        return 0;
    }
    percent.clamp(0.0, 100.0).round() as i32
}

pub fn compute_snapshot(completed_lessons: i64, total_lessons: i64) -> ProgressSnapshot {
    let total = total_lessons.max(0);
    let completed = completed_lessons.clamp(0, total);

    ProgressSnapshot {
        percent: percent_of(completed, total),
        completed_lessons: i32::try_from(completed).unwrap_or(i32::MAX),
        total_lessons: i32::try_from(total).unwrap_or(i32::MAX),
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Eligibility {
    pub eligible: bool,
    pub progress: ProgressSnapshot,
}

impl Eligibility {
    pub fn from_snapshot(progress: ProgressSnapshot) -> Self {
        Self {
            eligible: progress.percent >= 100,
            progress,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LessonProgressReport {
    /// When given, the lesson must belong to this course.
    pub course_id: Option<Uuid>,
    pub lesson_id: Uuid,
    pub percent: f64,
    /// Trusted as asserted, independent of `percent`.
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct LessonProgressOutcome {
    pub lesson: LessonProgress,
    pub course: ProgressSnapshot,
    /// Set when this report completed the course and a certificate exists for it.
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Clone)]
pub struct CourseProgress {
    pub lessons: Vec<LessonProgress>,
    pub course: ProgressSnapshot,
}

#[tracing::instrument(skip(mm, actor), fields(user_id = %actor.user_id()))]
pub async fn report_lesson_progress(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    report: LessonProgressReport,
) -> ServiceResult<LessonProgressOutcome> {
    let lesson = Lesson::find_by_id(mm, actor, report.lesson_id)
        .await
        .map_err(|e| ServiceError::database(Lesson::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(Lesson::get_resource_type()))?;

    if report.course_id.is_some_and(|c| c != lesson.course_id()) {
        return Err(ServiceError::NotFound(Lesson::get_resource_type()));
    }

    let course = access::find_course(mm, actor, lesson.course_id()).await?;
    let participation = access::participation(mm, actor, &course).await?;

    let stored = LessonProgress::upsert(
        mm,
        actor,
        LessonProgressUpsert {
            user_id: actor.user_id(),
            lesson_id: lesson.id(),
            course_id: course.id(),
            progress_percent: normalize_watch_percent(report.percent),
            completed: report.completed,
        },
    )
    .await
    .map_err(|e| ServiceError::database(LessonProgress::get_resource_type(), e))?;

    // the lesson row is committed and authoritative from here on
    let snapshot = match recompute_course_progress(mm, actor, actor.user_id(), course.id()).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!("course progress recompute failed, aggregate left stale");
            log_error(&e);
            stale_snapshot(&participation)
        }
    };

    let mut issued = None;
    if matches!(participation, Participation::Enrolled(_)) && Eligibility::from_snapshot(snapshot).eligible {
        match certificate::issue_certificate_if_eligible(mm, actor, actor.user_id(), course.id()).await {
            Ok(outcome) => issued = Some(outcome.certificate),
            Err(e) => {
                tracing::warn!("automatic certificate issuance failed");
                log_error(&e);
            }
        }
    }

    Ok(LessonProgressOutcome {
        lesson: stored,
        course: snapshot,
        certificate: issued,
    })
}

fn stale_snapshot(participation: &Participation) -> ProgressSnapshot {
    match participation.enrollment() {
        Some(e) => ProgressSnapshot {
            percent: e.progress_percent(),
            completed_lessons: e.completed_lessons(),
            total_lessons: e.total_lessons(),
        },
        None => compute_snapshot(0, 0),
    }
}

/// Recounts lessons and completions and writes the aggregate back.
///
/// A failing enrollment write is logged and swallowed; the returned snapshot is
/// still the freshly computed one. Users without an enrollment get the snapshot
/// and no write.
#[tracing::instrument(skip(mm, actor))]
pub async fn recompute_course_progress(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<ProgressSnapshot> {
    let (total, completed) = tokio::try_join!(
        Lesson::count_by_course(mm, actor, course_id),
        LessonProgress::count_completed(mm, actor, user_id, course_id),
    )
    .map_err(|e| ServiceError::database(LessonProgress::get_resource_type(), e))?;

    let snapshot = compute_snapshot(completed, total);

    match Enrollment::store_progress(mm, actor, user_id, course_id, snapshot).await {
        Ok(Some(_)) => {}
        Ok(None) => tracing::debug!("no enrollment to store progress on"),
        Err(e) => {
            tracing::warn!("unable to store course progress aggregate");
            log_error(&e);
        }
    }

    Ok(snapshot)
}

/// Recompute, then compare against 100%. Only enrolled users can be eligible.
#[tracing::instrument(skip(mm, actor))]
pub async fn check_certificate_eligibility(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<Eligibility> {
    access::find_course(mm, actor, course_id).await?;
    access::require_enrollment(mm, actor, user_id, course_id).await?;
    let snapshot = recompute_course_progress(mm, actor, user_id, course_id).await?;
    Ok(Eligibility::from_snapshot(snapshot))
}

#[tracing::instrument(skip(mm, actor), fields(user_id = %actor.user_id()))]
pub async fn course_progress(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    course_id: Uuid,
) -> ServiceResult<CourseProgress> {
    let course = access::find_course(mm, actor, course_id).await?;
    access::participation(mm, actor, &course).await?;

    let lessons = LessonProgress::all_by_user_course(mm, actor, actor.user_id(), course.id())
        .await
        .map_err(|e| ServiceError::database(LessonProgress::get_resource_type(), e))?;
    let course = recompute_course_progress(mm, actor, actor.user_id(), course.id()).await?;

    Ok(CourseProgress { lessons, course })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn percent_of_rounds_half_up_test() {
        assert_eq!(percent_of(2, 4), 50);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(1, 8), 13); // 12.5
        assert_eq!(percent_of(3, 4), 75);
        assert_eq!(percent_of(4, 4), 100);
    }

    #[test]
    fn percent_of_empty_whole_is_zero_test() {
        assert_eq!(percent_of(0, 0), 0);
        assert_eq!(percent_of(3, 0), 0);
        assert_eq!(percent_of(3, -1), 0);
    }

    #[test]
    fn percent_of_stays_in_range_test() {
        for whole in 1..=60 {
            for part in -2..=whole + 2 {
                let p = percent_of(part, whole);
                assert!((0..=100).contains(&p), "{part}/{whole} -> {p}");
            }
        }
    }

    #[test]
    fn percent_of_matches_float_rounding_test() {
        for whole in 1..=50i64 {
            for part in 0..=whole {
                let expected = (100.0 * part as f64 / whole as f64).round() as i32;
                assert_eq!(percent_of(part, whole), expected, "{part}/{whole}");
            }
        }
    }

    #[test]
    fn normalize_watch_percent_test() {
        assert_eq!(normalize_watch_percent(40.0), 40);
        assert_eq!(normalize_watch_percent(95.4), 95);
        assert_eq!(normalize_watch_percent(99.5), 100);
        assert_eq!(normalize_watch_percent(-10.0), 0);
        assert_eq!(normalize_watch_percent(250.0), 100);
        assert_eq!(normalize_watch_percent(f64::NAN), 0);
        assert_eq!(normalize_watch_percent(f64::INFINITY), 100);
    }

    #[test]
    fn snapshot_half_done_course_test() {
        // lessons 1 and 3 completed, lesson 2 at 40%, lesson 4 untouched
        let snapshot = compute_snapshot(2, 4);
        assert_eq!(
            snapshot,
            ProgressSnapshot {
                percent: 50,
                completed_lessons: 2,
                total_lessons: 4,
            }
        );
        assert!(!Eligibility::from_snapshot(snapshot).eligible);
    }

    #[test]
    fn snapshot_empty_course_test() {
        let snapshot = compute_snapshot(0, 0);
        assert_eq!(snapshot.percent, 0);
        assert!(!Eligibility::from_snapshot(snapshot).eligible);
    }

    #[test]
    fn snapshot_never_exceeds_total_test() {
        let snapshot = compute_snapshot(7, 4);
        assert_eq!(snapshot.completed_lessons, 4);
        assert_eq!(snapshot.percent, 100);
    }

    #[test]
    fn eligibility_threshold_test() {
        assert!(Eligibility::from_snapshot(compute_snapshot(3, 3)).eligible);
        assert!(!Eligibility::from_snapshot(compute_snapshot(98, 99)).eligible);

        let at_99 = ProgressSnapshot {
            percent: 99,
            completed_lessons: 99,
            total_lessons: 100,
        };
        assert!(!Eligibility::from_snapshot(at_99).eligible);
    }

    #[test]
    fn eligibility_follows_rounded_percent_test() {
        // 199/200 = 99.5% which rounds to 100
        let snapshot = compute_snapshot(199, 200);
        assert_eq!(snapshot.percent, 100);
        assert!(Eligibility::from_snapshot(snapshot).eligible);
    }
}
