use crate::blob::StoragePath;
use crate::locks::RecordLocks;
use crate::prelude::*;

/// Metadata of one uploaded video.
///
/// Field names on the wire follow the stored documents, hence the renames.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Video {
    pub id: Record<Video>,
    pub filename: String,
    #[serde(rename = "filepath")]
    pub storage_path: StoragePath,
    #[serde(rename = "user")]
    pub owner: String,
    #[serde(rename = "likes", default)]
    pub like_count: u64,
    #[serde(rename = "ratings", default)]
    pub rating_history: Vec<u8>,
    #[serde(rename = "averageRating", default)]
    pub average_rating: f64,
}

define_table!("videos" : Video);

define_relation! {
    Video > search(fragment: &str) > Vec<Video>
        where "SELECT * FROM videos WHERE string::lowercase(filename) CONTAINS string::lowercase($fragment)"
}

impl Video {
    /// A fresh record with no likes and no ratings.
    pub fn new(filename: impl Into<String>, storage_path: StoragePath, owner: impl Into<String>) -> Self {
        Self {
            id: Record::uuid(),
            filename: filename.into(),
            storage_path,
            owner: owner.into(),
            like_count: 0,
            rating_history: Vec::new(),
            average_rating: 0.0,
        }
    }

    #[instrument(skip(self, db), fields(id = %self.id))]
    pub async fn create(&self, db: &Database) -> Result<Video, DatabaseQueryError> {
        tracing::info!(video = ?self, "inserting video into the database");
        let created: Option<Video> = db
            .create(self.id.clone())
            .content(self)
            .await
            .context(MalformedQuerySnafu)?;

        created.context(EmptyQuerySnafu { id: self.id.key() })
    }

    #[instrument(skip(db))]
    pub async fn get(id: &Record<Video>, db: &Database) -> Result<Option<Video>, DatabaseQueryError> {
        db.select(id.clone()).await.context(MalformedQuerySnafu)
    }

    #[instrument(skip(db))]
    pub async fn all(db: &Database) -> Result<Vec<Video>, DatabaseQueryError> {
        tracing::debug!("fetching all videos from the database");
        db.select(Self::table()).await.context(MalformedQuerySnafu)
    }

    /// Overwrites the whole stored document with `self`.
    #[instrument(skip(self, db), fields(id = %self.id))]
    pub async fn update(&self, db: &Database) -> Result<Video, DatabaseQueryError> {
        let updated: Option<Video> = db
            .update(self.id.clone())
            .content(self)
            .await
            .context(MalformedQuerySnafu)?;

        updated.context(EmptyQuerySnafu { id: self.id.key() })
    }

    /// Reads the record, applies `change` and writes it back while holding the record's lock.
    ///
    /// Returns `None` when no such record exists, in which case nothing is written.
    #[instrument(skip(db, locks, change))]
    pub async fn modify(
        id: &Record<Video>,
        db: &Database,
        locks: &RecordLocks,
        change: impl FnOnce(&mut Video),
    ) -> Result<Option<Video>, DatabaseQueryError> {
        let _guard = locks.lock(id).await;

        let Some(mut video) = Self::get(id, db).await? else {
            return Ok(None);
        };

        change(&mut video);
        video.update(db).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConfig;

    async fn database() -> Database {
        Database::connect(&DatabaseConfig::memory().unwrap()).await.unwrap()
    }

    fn video(filename: &str) -> Video {
        Video::new(filename, StoragePath::for_file(filename), "alice@example.com")
    }

    #[tokio::test]
    async fn created_video_can_be_fetched() {
        let db = database().await;
        let video = video("clip.mp4");

        let created = video.create(&db).await.unwrap();
        assert_eq!(created, video);

        let fetched = Video::get(&video.id, &db).await.unwrap();
        assert_eq!(fetched, Some(video));
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let db = database().await;
        let missing = Record::<Video>::new("does-not-exist".to_string());

        assert_eq!(Video::get(&missing, &db).await.unwrap(), None);
    }

    #[tokio::test]
    async fn all_returns_every_video() {
        let db = database().await;
        for name in ["a.mp4", "b.mov", "c.avi"] {
            video(name).create(&db).await.unwrap();
        }

        let mut names: Vec<_> = Video::all(&db).await.unwrap().into_iter().map(|v| v.filename).collect();
        names.sort();
        assert_eq!(names, ["a.mp4", "b.mov", "c.avi"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let db = database().await;
        for name in ["CatVideo.mp4", "my_cat.mov", "dog.avi"] {
            video(name).create(&db).await.unwrap();
        }

        let mut found: Vec<_> = Video::search("cat", &db).await.unwrap().into_iter().map(|v| v.filename).collect();
        found.sort();
        assert_eq!(found, ["CatVideo.mp4", "my_cat.mov"]);

        let upper = Video::search("DOG", &db).await.unwrap();
        assert_eq!(upper.len(), 1);
        assert_eq!(upper[0].filename, "dog.avi");
    }

    #[tokio::test]
    async fn modify_writes_the_whole_document() {
        let db = database().await;
        let locks = RecordLocks::default();
        let video = video("clip.mp4").create(&db).await.unwrap();

        let modified = Video::modify(&video.id, &db, &locks, |video| video.like_count = 7)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(modified.like_count, 7);

        let stored = Video::get(&video.id, &db).await.unwrap().unwrap();
        assert_eq!(stored.like_count, 7);
    }

    #[tokio::test]
    async fn modify_of_missing_record_writes_nothing() {
        let db = database().await;
        let locks = RecordLocks::default();
        let missing = Record::<Video>::new("nope".to_string());

        let result = Video::modify(&missing, &db, &locks, |video| video.like_count += 1).await.unwrap();
        assert_eq!(result, None);
        assert!(Video::all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_modifications_are_not_lost() {
        let db = database().await;
        let locks = RecordLocks::default();
        let video = video("clip.mp4").create(&db).await.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let (db, locks, id) = (db.clone(), locks.clone(), video.id.clone());
                tokio::spawn(async move {
                    Video::modify(&id, &db, &locks, |video| video.like_count += 1).await.unwrap();
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        let stored = Video::get(&video.id, &db).await.unwrap().unwrap();
        assert_eq!(stored.like_count, 20);
    }
}
