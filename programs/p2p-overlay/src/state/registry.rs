use ahash::AHashMap;
use anchor_lang::prelude::Pubkey;
use solana_program::msg;

use crate::error::{ErrorCode, OverlayResult};
use crate::math::casting::Cast;
use crate::{math_error, safe_decrement, safe_increment, validate};


pub type DataIndex = u32;
pub const NIL: DataIndex = DataIndex::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryNode {
    pub account: Pubkey,
    pub value: u128,
    pub prev: DataIndex,
    pub next: DataIndex,
    /// Member of the ranked list (descending by value) rather than the overflow list
    pub ranked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeList {
    head: DataIndex,
    tail: DataIndex,
    len: u32,
}

impl NodeList {
    const EMPTY: NodeList = NodeList {
        head: NIL,
        tail: NIL,
        len: 0,
    };
}

/// Accounts of one (market, side, placement) ordered for the matching walk.
///
/// Up to `max_ranked_size` accounts are kept in a doubly linked list sorted by
/// descending value, equal values in insertion order. Everything else lives in
/// an insertion ordered overflow list. Both lists share one arena of slots so
/// that moving an account between them never reallocates. Traversal visits the
/// ranked list first, then the overflow list.
#[derive(Clone, Debug)]
pub struct PositionRegistry {
    nodes: Vec<RegistryNode>,
    free_slots: Vec<DataIndex>,
    index: AHashMap<Pubkey, DataIndex>,
    ranked: NodeList,
    overflow: NodeList,
    max_ranked_size: u32,
}

impl PositionRegistry {
    pub fn new(max_ranked_size: u32) -> Self {
        PositionRegistry {
            nodes: Vec::new(),
            free_slots: Vec::new(),
            index: AHashMap::new(),
            ranked: NodeList::EMPTY,
            overflow: NodeList::EMPTY,
            max_ranked_size,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn ranked_len(&self) -> u32 {
        self.ranked.len
    }

    pub fn overflow_len(&self) -> u32 {
        self.overflow.len
    }

    pub fn max_ranked_size(&self) -> u32 {
        self.max_ranked_size
    }

    pub fn contains(&self, account: &Pubkey) -> bool {
        self.index.contains_key(account)
    }

    pub fn get_value(&self, account: &Pubkey) -> Option<u128> {
        self.index
            .get(account)
            .and_then(|idx| self.nodes.get(*idx as usize))
            .map(|node| node.value)
    }

    pub fn is_ranked(&self, account: &Pubkey) -> Option<bool> {
        self.index
            .get(account)
            .and_then(|idx| self.nodes.get(*idx as usize))
            .map(|node| node.ranked)
    }

    pub fn head(&self) -> Option<Pubkey> {
        let idx = if self.ranked.head != NIL {
            self.ranked.head
        } else {
            self.overflow.head
        };

        self.nodes.get(idx as usize).map(|node| node.account)
    }

    pub fn next(&self, account: &Pubkey) -> OverlayResult<Option<Pubkey>> {
        let idx = self.get_index(account)?;
        let node = self.node(idx)?;

        let next = if node.next != NIL {
            node.next
        } else if node.ranked {
            self.overflow.head
        } else {
            NIL
        };

        if next == NIL {
            return Ok(None);
        }

        Ok(Some(self.node(next)?.account))
    }

    pub fn iter(&self) -> RegistryIter<'_> {
        RegistryIter {
            registry: self,
            current: if self.ranked.head != NIL {
                self.ranked.head
            } else {
                self.overflow.head
            },
        }
    }

    /// Inserts, moves or (for a zero value) removes `account`.
    pub fn update(&mut self, account: &Pubkey, value: u128) -> OverlayResult {
        let idx = match self.index.get(account) {
            Some(idx) => *idx,
            None => {
                if value == 0 {
                    return Ok(());
                }

                let idx = self.allocate(RegistryNode {
                    account: *account,
                    value,
                    prev: NIL,
                    next: NIL,
                    ranked: false,
                })?;
                self.index.insert(*account, idx);
                return self.place(idx);
            }
        };

        if value == 0 {
            return self.remove(account);
        }

        if self.node(idx)?.value == value {
            return Ok(());
        }

        self.unlink(idx)?;
        self.node_mut(idx)?.value = value;
        self.place(idx)
    }

    pub fn remove(&mut self, account: &Pubkey) -> OverlayResult {
        let idx = self.get_index(account)?;
        let was_ranked = self.node(idx)?.ranked;

        self.unlink(idx)?;
        self.index.remove(account);
        self.free_slots.push(idx);

        if was_ranked {
            self.promote_overflow()?;
        }

        Ok(())
    }

    pub fn set_max_ranked_size(&mut self, max_ranked_size: u32) -> OverlayResult {
        self.max_ranked_size = max_ranked_size;

        // smallest ranked entries go to the front of the overflow, largest first
        while self.ranked.len > self.max_ranked_size {
            let idx = self.ranked.tail;
            self.unlink(idx)?;
            self.link(idx, false, NIL)?;
        }

        self.promote_overflow()
    }

    fn get_index(&self, account: &Pubkey) -> OverlayResult<DataIndex> {
        match self.index.get(account) {
            Some(idx) => Ok(*idx),
            None => {
                msg!("account {} not in registry", account);
                Err(ErrorCode::RegistryEntryNotFound)
            }
        }
    }

    fn node(&self, idx: DataIndex) -> OverlayResult<&RegistryNode> {
        self.nodes
            .get(idx as usize)
            .ok_or(ErrorCode::RegistryCorrupted)
    }

    fn node_mut(&mut self, idx: DataIndex) -> OverlayResult<&mut RegistryNode> {
        self.nodes
            .get_mut(idx as usize)
            .ok_or(ErrorCode::RegistryCorrupted)
    }

    fn list_mut(&mut self, ranked: bool) -> &mut NodeList {
        if ranked {
            &mut self.ranked
        } else {
            &mut self.overflow
        }
    }

    fn allocate(&mut self, node: RegistryNode) -> OverlayResult<DataIndex> {
        if let Some(idx) = self.free_slots.pop() {
            *self.node_mut(idx)? = node;
            return Ok(idx);
        }

        let idx: DataIndex = self.nodes.len().cast()?;
        validate!(
            idx != NIL,
            ErrorCode::RegistryCorrupted,
            "registry arena exhausted"
        )?;
        self.nodes.push(node);

        Ok(idx)
    }

    /// Links a detached node right after `prev` (`NIL` for the front).
    fn link(&mut self, idx: DataIndex, ranked: bool, prev: DataIndex) -> OverlayResult {
        let next = if prev == NIL {
            self.list_mut(ranked).head
        } else {
            self.node(prev)?.next
        };

        {
            let node = self.node_mut(idx)?;
            node.prev = prev;
            node.next = next;
            node.ranked = ranked;
        }

        if prev == NIL {
            self.list_mut(ranked).head = idx;
        } else {
            self.node_mut(prev)?.next = idx;
        }

        if next == NIL {
            self.list_mut(ranked).tail = idx;
        } else {
            self.node_mut(next)?.prev = idx;
        }

        let list = self.list_mut(ranked);
        safe_increment!(list.len, 1);

        Ok(())
    }

    fn unlink(&mut self, idx: DataIndex) -> OverlayResult {
        let RegistryNode {
            prev, next, ranked, ..
        } = *self.node(idx)?;

        if prev == NIL {
            self.list_mut(ranked).head = next;
        } else {
            self.node_mut(prev)?.next = next;
        }

        if next == NIL {
            self.list_mut(ranked).tail = prev;
        } else {
            self.node_mut(next)?.prev = prev;
        }

        let list = self.list_mut(ranked);
        safe_decrement!(list.len, 1);

        let node = self.node_mut(idx)?;
        node.prev = NIL;
        node.next = NIL;

        Ok(())
    }

    /// Sorted insertion into the ranked list, after every entry of equal or greater value.
    fn insert_ranked(&mut self, idx: DataIndex) -> OverlayResult {
        let value = self.node(idx)?.value;

        let mut prev = NIL;
        let mut current = self.ranked.head;
        while current != NIL {
            let node = self.node(current)?;
            if node.value < value {
                break;
            }
            prev = current;
            current = node.next;
        }

        self.link(idx, true, prev)
    }

    fn place(&mut self, idx: DataIndex) -> OverlayResult {
        if self.ranked.len < self.max_ranked_size {
            return self.insert_ranked(idx);
        }

        let value = self.node(idx)?.value;
        let ranked_tail = self.ranked.tail;
        if ranked_tail != NIL && value > self.node(ranked_tail)?.value {
            self.insert_ranked(idx)?;

            let demoted = self.ranked.tail;
            self.unlink(demoted)?;
            let overflow_tail = self.overflow.tail;
            return self.link(demoted, false, overflow_tail);
        }

        let overflow_tail = self.overflow.tail;
        self.link(idx, false, overflow_tail)
    }

    fn promote_overflow(&mut self) -> OverlayResult {
        while self.ranked.len < self.max_ranked_size && self.overflow.head != NIL {
            let idx = self.overflow.head;
            self.unlink(idx)?;
            self.insert_ranked(idx)?;
        }

        Ok(())
    }
}

pub struct RegistryIter<'a> {
    registry: &'a PositionRegistry,
    current: DataIndex,
}

impl<'a> Iterator for RegistryIter<'a> {
    type Item = (Pubkey, u128);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.registry.nodes.get(self.current as usize)?;

        self.current = if node.next != NIL {
            node.next
        } else if node.ranked {
            self.registry.overflow.head
        } else {
            NIL
        };

        Some((node.account, node.value))
    }
}
