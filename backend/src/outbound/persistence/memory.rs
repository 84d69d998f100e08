//! In-memory document-store adapters.
//!
//! Each adapter keeps documents in a `RwLock<HashMap>` keyed by identity,
//! plus the secondary indexes needed to enforce the store's uniqueness
//! constraints (user email, post title) at write time. Updates replace the
//! whole document, mirroring a document store's read-modify-write unit; no
//! finer-grained locking is provided, so concurrent writers race exactly as
//! the domain documents.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    CommentRepository, PostRepository, StoreError, UserRepository,
};
use crate::domain::{Comment, CommentId, Post, PostId, User, UserId};

#[derive(Default)]
struct UserTable {
    documents: HashMap<Uuid, User>,
    email_index: HashMap<String, Uuid>,
}

/// In-memory [`UserRepository`] with a unique email index.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let email = user.email().as_ref().to_owned();
        if table.email_index.contains_key(&email) {
            return Err(StoreError::duplicate("email"));
        }
        table.email_index.insert(email, *user.id().as_uuid());
        table.documents.insert(*user.id().as_uuid(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let key = *user.id().as_uuid();
        if let Some(previous) = table.documents.get(&key) {
            let previous_email = previous.email().as_ref().to_owned();
            if previous_email != user.email().as_ref() {
                table.email_index.remove(&previous_email);
                table
                    .email_index
                    .insert(user.email().as_ref().to_owned(), key);
            }
        }
        table.documents.insert(key, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.documents.get(id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.documents.get(id))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.documents.values().cloned().collect())
    }
}

#[derive(Default)]
struct PostTable {
    documents: HashMap<Uuid, Post>,
    title_index: HashMap<String, Uuid>,
}

/// In-memory [`PostRepository`] with a unique title index.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<PostTable>,
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let title = post.title().as_ref().to_owned();
        if table.title_index.contains_key(&title) {
            return Err(StoreError::duplicate("title"));
        }
        table.title_index.insert(title, *post.id().as_uuid());
        table.documents.insert(*post.id().as_uuid(), post.clone());
        Ok(())
    }

    async fn update(&self, post: &Post) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let key = *post.id().as_uuid();
        if let Some(previous) = table.documents.get(&key) {
            let previous_title = previous.title().as_ref().to_owned();
            if previous_title != post.title().as_ref() {
                let new_title = post.title().as_ref().to_owned();
                if table
                    .title_index
                    .get(&new_title)
                    .is_some_and(|owner| *owner != key)
                {
                    return Err(StoreError::duplicate("title"));
                }
                table.title_index.remove(&previous_title);
                table.title_index.insert(new_title, key);
            }
        }
        table.documents.insert(key, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.documents.get(id.as_uuid()).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.documents.values().cloned().collect())
    }
}

/// In-memory [`CommentRepository`]; comments are immutable, so there is no
/// update path or secondary index.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    documents: RwLock<HashMap<Uuid, Comment>>,
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        documents.insert(*comment.id().as_uuid(), comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(id.as_uuid()).cloned())
    }

    async fn list(&self) -> Result<Vec<Comment>, StoreError> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(documents.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, PasswordHash, Title};
    use rstest::rstest;

    fn user(email: &str) -> User {
        let email = Email::new(email).expect("valid email");
        User::new(UserId::random(), email, PasswordHash::from_stored("ab$cd"))
    }

    fn post(title: &str) -> Post {
        let title = Title::new(title).expect("valid title");
        Post::new(PostId::random(), title, UserId::random())
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_fails_and_leaves_existing_record() {
        let repo = InMemoryUserRepository::default();
        let first = user("ada@example.com");
        repo.insert(&first).await.expect("first insert succeeds");

        let second = user("ada@example.com");
        let err = repo
            .insert(&second)
            .await
            .expect_err("duplicate email must fail");
        assert_eq!(err, StoreError::duplicate("email"));

        let stored = repo
            .find_by_email("ada@example.com")
            .await
            .expect("lookup succeeds")
            .expect("record present");
        assert_eq!(stored.id(), first.id());
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_the_whole_document() {
        let repo = InMemoryUserRepository::default();
        let mut stored = user("ada@example.com");
        repo.insert(&stored).await.expect("insert succeeds");

        stored.record_post(PostId::random());
        repo.update(&stored).await.expect("update succeeds");

        let reloaded = repo
            .find_by_id(stored.id())
            .await
            .expect("lookup succeeds")
            .expect("record present");
        assert_eq!(reloaded.posts(), stored.posts());
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_title_fails_insert() {
        let repo = InMemoryPostRepository::default();
        repo.insert(&post("Hello")).await.expect("first insert");
        let err = repo
            .insert(&post("Hello"))
            .await
            .expect_err("duplicate title must fail");
        assert_eq!(err, StoreError::duplicate("title"));
    }

    #[rstest]
    #[tokio::test]
    async fn rename_onto_existing_title_fails_update() {
        let repo = InMemoryPostRepository::default();
        repo.insert(&post("First")).await.expect("insert first");
        let mut second = post("Second");
        repo.insert(&second).await.expect("insert second");

        second.set_title(Title::new("First").expect("valid title"));
        let err = repo
            .update(&second)
            .await
            .expect_err("rename onto taken title must fail");
        assert_eq!(err, StoreError::duplicate("title"));
    }

    #[rstest]
    #[tokio::test]
    async fn rename_frees_the_previous_title() {
        let repo = InMemoryPostRepository::default();
        let mut original = post("Old name");
        repo.insert(&original).await.expect("insert");

        original.set_title(Title::new("New name").expect("valid title"));
        repo.update(&original).await.expect("rename succeeds");

        repo.insert(&post("Old name"))
            .await
            .expect("released title is reusable");
    }
}
