use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::CoreError;
use crate::core::gate;
use crate::core::store::{
    LookupError, MatchRegistry, MessageArchive, NotificationSink, RatingLedger, UserLookup,
};
use crate::models::{Match, MatchView, RatingKind};

/// Orchestrates the rating -> match lifecycle.
///
/// All rating and match writes go through this engine; nothing else in
/// the service touches the rating ledger or the match registry directly.
pub struct MatchingEngine {
    users: Arc<dyn UserLookup>,
    ratings: Arc<dyn RatingLedger>,
    matches: Arc<dyn MatchRegistry>,
    messages: Arc<dyn MessageArchive>,
    notifier: Arc<dyn NotificationSink>,
}

impl MatchingEngine {
    pub fn new(
        users: Arc<dyn UserLookup>,
        ratings: Arc<dyn RatingLedger>,
        matches: Arc<dyn MatchRegistry>,
        messages: Arc<dyn MessageArchive>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            users,
            ratings,
            matches,
            messages,
            notifier,
        }
    }

    /// Rate a user and form a match on mutual LIKE.
    ///
    /// Returns the newly created match, or None when no match was formed
    /// on this call. Duplicate ratings, one-sided likes, dislikes, and
    /// already-matched pairs all complete silently with None; unknown
    /// user ids abort with NotFound before anything is written.
    pub async fn rate_user(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
        kind: RatingKind,
    ) -> Result<Option<Match>, CoreError> {
        tracing::info!("User {} rating user {} with {:?}", rater_id, rated_user_id, kind);

        let rater = self.users.by_id(rater_id).await?;
        let rated = self.users.by_id(rated_user_id).await?;

        if rater_id == rated_user_id {
            return Err(CoreError::InvalidState(
                "users cannot rate themselves".to_string(),
            ));
        }

        let inserted = self.ratings.record(rater_id, rated_user_id, kind).await?;
        if !inserted {
            tracing::warn!("User {} has already rated user {}", rater_id, rated_user_id);
            return Ok(None);
        }

        tracing::info!(
            "Rating saved: {} rated {} as {:?}",
            rater_id,
            rated_user_id,
            kind
        );

        if kind != RatingKind::Like {
            return Ok(None);
        }

        let reciprocal = self.ratings.reciprocal(rater_id, rated_user_id).await?;
        match reciprocal {
            Some(r) if r.kind == RatingKind::Like => {}
            _ => {
                tracing::debug!(
                    "No mutual like yet between user {} and user {}",
                    rater_id,
                    rated_user_id
                );
                return Ok(None);
            }
        }

        if self.matches.exists_between(rater_id, rated_user_id).await? {
            tracing::debug!(
                "Match already exists between user {} and user {}",
                rater_id,
                rated_user_id
            );
            return Ok(None);
        }

        // The pair index is the real de-duplication point: a concurrent
        // reciprocal rate() can win between the check above and this
        // insert, in which case create returns None.
        let Some(created) = self.matches.create(rater_id, rated_user_id).await? else {
            tracing::debug!(
                "Concurrent match creation for users {} and {}",
                rater_id,
                rated_user_id
            );
            return Ok(None);
        };

        tracing::info!("User {} and user {} matched", rater_id, rated_user_id);

        if let Err(e) = self.notifier.match_created(rater_id, &rated, created.id).await {
            tracing::warn!("Failed to notify user {} of new match: {}", rater_id, e);
        }
        if let Err(e) = self
            .notifier
            .match_created(rated_user_id, &rater, created.id)
            .await
        {
            tracing::warn!("Failed to notify user {} of new match: {}", rated_user_id, e);
        }

        Ok(Some(created))
    }

    /// All matches for a user, rendered from that user's perspective.
    ///
    /// Unread counts and the last message are computed on read rather
    /// than kept as counters.
    pub async fn matches_for_user(
        &self,
        user_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<MatchView>, CoreError> {
        tracing::debug!(
            "Fetching matches for user {} (active_only: {})",
            user_id,
            active_only
        );

        self.users.by_id(user_id).await?;

        let matches = self.matches.for_user(user_id, active_only).await?;
        tracing::info!("Found {} matches for user {}", matches.len(), user_id);

        let mut views = Vec::with_capacity(matches.len());
        for m in matches {
            match self.render_view(&m, user_id).await? {
                Some(view) => views.push(view),
                None => continue,
            }
        }

        Ok(views)
    }

    /// A single match rendered for one of its participants.
    pub async fn match_for_user(
        &self,
        match_id: Uuid,
        user_id: Uuid,
    ) -> Result<MatchView, CoreError> {
        self.users.by_id(user_id).await?;

        let m = self
            .matches
            .by_id(match_id)
            .await?
            .ok_or_else(|| CoreError::match_not_found(match_id))?;
        gate::authorize(&m, user_id)?;

        self.render_view(&m, user_id)
            .await?
            .ok_or_else(CoreError::access_denied)
    }

    /// Deactivate a match and clear its conversation.
    ///
    /// Messages are deleted before the active flag flips; the two steps
    /// are not one transaction, so a crash in between leaves an active
    /// match with an empty conversation.
    pub async fn unmatch(&self, user_id: Uuid, match_id: Uuid) -> Result<(), CoreError> {
        tracing::info!("User {} initiating unmatch for match {}", user_id, match_id);

        let m = self
            .matches
            .by_id(match_id)
            .await?
            .ok_or_else(|| CoreError::match_not_found(match_id))?;
        gate::authorize(&m, user_id)?;

        let deleted = self.messages.delete_for_match(match_id).await?;
        tracing::info!("Deleted {} messages for match {}", deleted, match_id);

        if self.matches.deactivate(match_id).await? {
            tracing::info!("Match {} deactivated by user {}", match_id, user_id);
        } else {
            tracing::debug!("Match {} was already inactive", match_id);
        }

        Ok(())
    }

    /// Permanently remove a match and its conversation.
    pub async fn delete_match(&self, user_id: Uuid, match_id: Uuid) -> Result<(), CoreError> {
        tracing::info!("User {} permanently deleting match {}", user_id, match_id);

        let m = self
            .matches
            .by_id(match_id)
            .await?
            .ok_or_else(|| CoreError::match_not_found(match_id))?;
        gate::authorize(&m, user_id)?;

        // Messages first: the schema refuses to drop a match that still
        // has rows pointing at it.
        self.messages.delete_for_match(match_id).await?;
        self.matches.hard_delete(match_id).await?;

        tracing::info!("Match {} permanently deleted by user {}", match_id, user_id);
        Ok(())
    }

    async fn render_view(
        &self,
        m: &Match,
        user_id: Uuid,
    ) -> Result<Option<MatchView>, CoreError> {
        let Some(other_id) = m.other_participant(user_id) else {
            return Ok(None);
        };

        let matched_user = match self.users.by_id(other_id).await {
            Ok(profile) => profile,
            Err(LookupError::NotFound(_)) => {
                // The other side's profile is gone from the directory;
                // the match is unrenderable rather than an error.
                tracing::warn!(
                    "Directory has no profile for user {} in match {}",
                    other_id,
                    m.id
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let last_message = self.messages.latest_for_match(m.id).await?;
        let unread_count = self.messages.unread_count_for_match(m.id, user_id).await?;

        Ok(Some(MatchView {
            match_id: m.id,
            matched_user,
            matched_at: m.matched_at,
            is_active: m.is_active,
            last_message,
            unread_count,
        }))
    }
}
