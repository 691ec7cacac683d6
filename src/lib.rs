//! This crate implements a Red-Black tree of ordered keys. Keys are placed as in a plain binary
//! search tree, then the tree is recoloured and rotated on the way back up so that its height
//! stays within `2 * log2(n + 1)`.
//!
//! ```rust
//! # use redblack::RbTree;
//!
//! let mut tree = RbTree::new();
//! for key in [10, 20, 30, 15, 25, 5, 1] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.len(), 7);
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

extern crate alloc;

mod error;

pub use error::{Error, Result};

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{self, Debug, Display};
use core::marker::PhantomData;
use core::ptr::NonNull;

use log::{debug, trace, warn};

/// A link from one node to another. `None` stands for an absent child, which counts as black.
type Link<K> = Option<NonNull<RbNode<K>>>;

/// A Red-Black tree holding keys in order. Equal keys are all kept, each one settling to the
/// right of the equal keys inserted before it.
pub struct RbTree<K> {
    /// The root node of the tree.
    root: Link<K>,
    /// The amount of nodes in the tree.
    len: usize,
    /// The tree owns every node reachable from `root`.
    _owns: PhantomData<Box<RbNode<K>>>,
}

// SAFETY: the tree exclusively owns its nodes, so sending or sharing it is the same as sending or
// sharing the keys.
unsafe impl<K: Send> Send for RbTree<K> {}
unsafe impl<K: Sync> Sync for RbTree<K> {}

impl<K> RbTree<K> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the amount of keys stored in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The colour of a possibly absent node. Absent nodes are black.
    fn colour_of(node: Link<K>) -> Colour {
        match node {
            // SAFETY: every link stored in the tree points at a live node owned by it.
            Some(node) => unsafe { (*node.as_ptr()).colour },
            None => Colour::Black,
        }
    }

    /// Which side of `parent` the node `child` hangs on.
    ///
    /// ## Safety
    /// - `parent` must be valid and `child` must be one of its children.
    unsafe fn side_of(parent: NonNull<RbNode<K>>, child: NonNull<RbNode<K>>) -> Direction {
        match (&(*parent.as_ptr()))[Direction::Left] == Some(child) {
            true => Direction::Left,
            false => Direction::Right,
        }
    }

    /// Rotate the subtree rooted at `root` towards `dir`. The child of `root` opposite `dir`
    /// takes its place, `root` becomes that child's `dir` child, and the inner grandchild moves
    /// across to `root`. Colours are left alone. Returns the new subtree root.
    ///
    /// ## Safety
    /// - All pointers must be either valid or null
    /// - The child in the opposite direction of dir of root must be non null.
    unsafe fn rotate_dir_root(
        &mut self,
        root: NonNull<RbNode<K>>,
        dir: Direction,
    ) -> NonNull<RbNode<K>> {
        let parent = (*root.as_ptr()).parent;
        let pivot = (&(*root.as_ptr()))[dir.opposite()];
        debug_assert!(pivot.is_some());
        let pivot = pivot.unwrap_unchecked();
        let inner = (&(*pivot.as_ptr()))[dir];

        (&mut (*root.as_ptr()))[dir.opposite()] = inner;
        if let Some(inner) = inner {
            (*inner.as_ptr()).parent = Some(root);
        }
        (&mut (*pivot.as_ptr()))[dir] = Some(root);
        (*root.as_ptr()).parent = Some(pivot);
        (*pivot.as_ptr()).parent = parent;
        match parent {
            Some(parent) => {
                let parent_dir = Self::side_of(parent, root);
                (&mut (*parent.as_ptr()))[parent_dir] = Some(pivot);
            }
            None => self.root = Some(pivot),
        }

        debug!("rotated {dir}, new subtree root is tree root: {}", parent.is_none());
        pivot
    }

    /// Left rotation at `node`: its right child takes its place.
    ///
    /// Fails with [`Error::InvariantViolation`] and leaves the tree untouched if `node` has no
    /// right child.
    ///
    /// ## Safety
    /// - `node` must be a node owned by this tree.
    unsafe fn rotate_left(&mut self, node: NonNull<RbNode<K>>) -> Result<NonNull<RbNode<K>>> {
        if (&(*node.as_ptr()))[Direction::Right].is_none() {
            warn!("refusing to rotate left at a node without a right child");
            return Err(Error::InvariantViolation {
                rotation: Direction::Left,
            });
        }
        Ok(self.rotate_dir_root(node, Direction::Left))
    }

    /// Right rotation at `node`: its left child takes its place.
    ///
    /// Fails with [`Error::InvariantViolation`] and leaves the tree untouched if `node` has no
    /// left child.
    ///
    /// ## Safety
    /// - `node` must be a node owned by this tree.
    unsafe fn rotate_right(&mut self, node: NonNull<RbNode<K>>) -> Result<NonNull<RbNode<K>>> {
        if (&(*node.as_ptr()))[Direction::Left].is_none() {
            warn!("refusing to rotate right at a node without a left child");
            return Err(Error::InvariantViolation {
                rotation: Direction::Right,
            });
        }
        Ok(self.rotate_dir_root(node, Direction::Right))
    }

    /// ## Safety
    /// - `node` must be a node owned by this tree.
    unsafe fn rotate(
        &mut self,
        node: NonNull<RbNode<K>>,
        dir: Direction,
    ) -> Result<NonNull<RbNode<K>>> {
        match dir {
            Direction::Left => self.rotate_left(node),
            Direction::Right => self.rotate_right(node),
        }
    }

    /// Insert a key into the tree. Keys that are not less than a node's key go to its right, so
    /// duplicates are kept.
    ///
    /// ```rust
    /// # use redblack::RbTree;
    ///
    /// let mut tree = RbTree::default();
    ///
    /// tree.insert(4);
    /// tree.insert(5);
    /// tree.insert(4);
    ///
    /// assert_eq!(tree.len(), 3);
    /// ```
    pub fn insert(&mut self, key: K)
    where
        K: PartialOrd,
    {
        let mut parent = None;
        let mut cur = self.root;
        let mut dir = Direction::Left;
        let mut depth = 0usize;
        // Walk down to an empty child slot, remembering the node above it and which side of that
        // node the slot is on.
        while let Some(node) = cur {
            // SAFETY: all pointers should be kept valid in this data structure.
            let node = unsafe { &*node.as_ptr() };
            dir = match key < node.key {
                true => Direction::Left,
                false => Direction::Right,
            };
            parent = cur;
            cur = node[dir];
            depth += 1;
        }

        // A lone root is black straight away; every other node starts red so black heights are
        // unchanged by the attach.
        let colour = match parent {
            None => Colour::Black,
            Some(_) => Colour::Red,
        };
        let node = NonNull::from(Box::leak(Box::new(RbNode {
            key,
            colour,
            parent,
            child: [None, None],
        })));
        self.len += 1;

        let Some(parent) = parent else {
            trace!("inserted root");
            self.root = Some(node);
            return;
        };
        // SAFETY: `parent` is a live node of this tree and its `dir` slot is empty.
        unsafe { (&mut (*parent.as_ptr()))[dir] = Some(node) };
        trace!("attached red node as {dir} child at depth {depth}");

        // SAFETY: `node` was just linked into this tree.
        if let Err(err) = unsafe { self.fix_insert(node) } {
            unreachable!("insert fixup broke the rotation precondition: {err}");
        }
    }

    /// Restore the red-black properties after `node` was attached as a red leaf. The only
    /// possible violation is a red-red edge between `node` and its parent, and each step either
    /// removes it or moves it two levels up.
    ///
    /// ## Safety
    /// - `node` must be a node owned by this tree.
    unsafe fn fix_insert(&mut self, mut node: NonNull<RbNode<K>>) -> Result<()> {
        while let Some(parent) = (*node.as_ptr()).parent {
            if (*parent.as_ptr()).colour == Colour::Black {
                break;
            }
            // The root is black, so a red parent always has a parent of its own.
            let Some(grandparent) = (*parent.as_ptr()).parent else {
                debug_assert!(false, "red node at the root");
                break;
            };
            let side = Self::side_of(grandparent, parent);
            let uncle = (&(*grandparent.as_ptr()))[side.opposite()];

            if let Some(uncle) = uncle.filter(|&u| Self::colour_of(Some(u)) == Colour::Red) {
                trace!("fixup: red uncle, recolouring");
                (*parent.as_ptr()).colour = Colour::Black;
                (*uncle.as_ptr()).colour = Colour::Black;
                (*grandparent.as_ptr()).colour = Colour::Red;
                node = grandparent;
                continue;
            }

            if Some(node) == (&(*parent.as_ptr()))[side.opposite()] {
                trace!("fixup: black uncle, inner child");
                node = parent;
                self.rotate(node, side)?;
            }

            trace!("fixup: black uncle, outer child");
            let parent = (*node.as_ptr()).parent.unwrap_unchecked();
            (*parent.as_ptr()).colour = Colour::Black;
            (*grandparent.as_ptr()).colour = Colour::Red;
            self.rotate(grandparent, side.opposite())?;
        }

        // Recolouring can leave the root red.
        if let Some(root) = self.root {
            (*root.as_ptr()).colour = Colour::Black;
        }
        Ok(())
    }
}

impl<K> Drop for RbTree<K> {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            for child in unsafe { (*node.as_ptr()).child }.into_iter().flatten() {
                stack.push(child);
            }

            drop(unsafe { Box::from_raw(node.as_ptr()) });
        }
    }
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
            _owns: PhantomData,
        }
    }
}

impl<K: Debug> Debug for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbTree")
            .field("len", &self.len)
            .field("root", &DebugLink::new(self.root))
            .finish()
    }
}

/// Formats a subtree as nested nodes.
struct DebugLink<'a, K> {
    link: Link<K>,
    _tree: PhantomData<&'a RbTree<K>>,
}

impl<K> DebugLink<'_, K> {
    fn new(link: Link<K>) -> Self {
        Self {
            link,
            _tree: PhantomData,
        }
    }
}

impl<K: Debug> Debug for DebugLink<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(node) = self.link else {
            return f.write_str("Nil");
        };
        // SAFETY: the link belongs to a tree borrowed for the lifetime of this formatter.
        let node = unsafe { &*node.as_ptr() };
        f.debug_struct("RbNode")
            .field("key", &node.key)
            .field("colour", &node.colour)
            .field("left", &DebugLink::<K>::new(node[Direction::Left]))
            .field("right", &DebugLink::<K>::new(node[Direction::Right]))
            .finish()
    }
}

/// A direction for a node to be in, in a binary tree. Also names the way a rotation turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The left child, or a rotation that lifts the right child.
    Left,
    /// The right child, or a rotation that lifts the left child.
    Right,
}

impl Direction {
    /// Get the opposite of a direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

/// The colour of an RbNode. See `RbNode` for more info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    Red,
    Black,
}

/// An RbNode. Each node has a key, and a colour used for balancing.
struct RbNode<K> {
    key: K,
    /// The colour of this node. Every node has a colour for balancing purposes.
    colour: Colour,

    /// A raw pointer to the parent of this node. This pointer is None iff the node is the root
    /// node. It never owns the parent.
    parent: Link<K>,
    /// Our two child nodes, owned by this node.
    child: [Link<K>; 2],
}

impl<K> core::ops::Index<Direction> for RbNode<K> {
    type Output = Link<K>;

    fn index(&self, index: Direction) -> &Self::Output {
        match index {
            Direction::Left => &self.child[0],
            Direction::Right => &self.child[1],
        }
    }
}

impl<K> core::ops::IndexMut<Direction> for RbNode<K> {
    fn index_mut(&mut self, index: Direction) -> &mut Self::Output {
        match index {
            Direction::Left => &mut self.child[0],
            Direction::Right => &mut self.child[1],
        }
    }
}
