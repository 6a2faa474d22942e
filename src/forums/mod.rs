//! Forums and topics.
//!
//! The forum tree is owned by the forum management layer. The privilege engine
//! only ever looks at forum IDs; [`Forum::parent_id`] is carried so callers can
//! walk the tree themselves.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::macros::make_id;
use crate::store::StoreError;

make_id! {
	/// A unique identifier for a forum or category.
	ForumId as u32
}

make_id! {
	/// A unique identifier for a topic.
	TopicId as u32
}

/// A forum, or a category if it has no parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Forum
{
	pub id: ForumId,
	pub parent_id: Option<ForumId>,
}

impl Forum
{
	pub fn new(id: ForumId, parent_id: Option<ForumId>) -> Self
	{
		Self { id, parent_id }
	}

	/// Categories are forums without a parent.
	pub fn is_category(&self) -> bool
	{
		self.parent_id.is_none()
	}
}

/// A topic inside a forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic
{
	pub id: TopicId,
	pub forum: Forum,
}

/// Anything that belongs to a forum.
///
/// Privilege checks on topics (and posts, attachments, ...) are checks on the
/// forum that contains them. A forum belongs to itself.
pub trait HasForum
{
	fn forum(&self) -> &Forum;
}

impl HasForum for Forum
{
	fn forum(&self) -> &Forum
	{
		self
	}
}

impl HasForum for Topic
{
	fn forum(&self) -> &Forum
	{
		&self.forum
	}
}

/// Anything that identifies a forum.
///
/// This lets privilege lookups take either forum objects or bare IDs.
pub trait AsForumId
{
	fn forum_id(&self) -> ForumId;
}

impl AsForumId for ForumId
{
	fn forum_id(&self) -> ForumId
	{
		*self
	}
}

impl AsForumId for Forum
{
	fn forum_id(&self) -> ForumId
	{
		self.id
	}
}

impl<T> AsForumId for &T
where
	T: ?Sized + AsForumId,
{
	fn forum_id(&self) -> ForumId
	{
		T::forum_id(*self)
	}
}

/// Source of truth for which forums exist.
pub trait ForumProvider
{
	/// Returns the IDs of every known forum and category.
	async fn all_forum_ids(&self) -> Result<BTreeSet<ForumId>, StoreError>;
}

impl<F> ForumProvider for &F
where
	F: ?Sized + ForumProvider,
{
	async fn all_forum_ids(&self) -> Result<BTreeSet<ForumId>, StoreError>
	{
		F::all_forum_ids(*self).await
	}
}

/// A fixed set of forums.
#[derive(Debug, Default, Clone)]
pub struct StaticForums
{
	forums: Vec<Forum>,
}

impl StaticForums
{
	pub fn new(forums: impl IntoIterator<Item = Forum>) -> Self
	{
		Self { forums: forums.into_iter().collect() }
	}

	pub fn forums(&self) -> &[Forum]
	{
		&self.forums
	}

	/// Looks up a forum by ID.
	pub fn get(&self, id: ForumId) -> Option<&Forum>
	{
		self.forums.iter().find(|forum| forum.id == id)
	}

	/// Returns the direct children of `parent`.
	pub fn children(&self, parent: ForumId) -> impl Iterator<Item = &Forum>
	{
		self.forums
			.iter()
			.filter(move |forum| forum.parent_id == Some(parent))
	}
}

impl ForumProvider for StaticForums
{
	async fn all_forum_ids(&self) -> Result<BTreeSet<ForumId>, StoreError>
	{
		Ok(self.forums.iter().map(|forum| forum.id).collect())
	}
}
