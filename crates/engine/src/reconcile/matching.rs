//! Handshake matching of incoming entities against existing ones.
//!
//! Matching is an ordered list of pure strategies. Each looks a candidate
//! up in an [`EntityIndex`]; the first hit wins. An entity that has been
//! matched is claimed and removed from the index so two incoming entities
//! never land on the same existing one.

use std::collections::HashMap;

/// The incoming side of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Design-tool identity of the incoming entity.
    pub original_id: String,
    /// Name key, e.g. `colors:brand/primary` for variables.
    pub name_key: String,
}

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    OriginalId,
    Name,
}

/// Existing entities indexed by recorded origin and by name key.
#[derive(Debug)]
pub struct EntityIndex<T> {
    items: Vec<Option<T>>,
    by_origin: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl<T> EntityIndex<T> {
    /// Build an index. When several entities share a key the first one wins.
    pub fn new<I, O, N>(entities: I, origin: O, name_key: N) -> Self
    where
        I: IntoIterator<Item = T>,
        O: Fn(&T) -> Option<String>,
        N: Fn(&T) -> String,
    {
        let mut index = EntityIndex {
            items: Vec::new(),
            by_origin: HashMap::new(),
            by_name: HashMap::new(),
        };
        for (i, entity) in entities.into_iter().enumerate() {
            if let Some(o) = origin(&entity) {
                index.by_origin.entry(o).or_insert(i);
            }
            index.by_name.entry(name_key(&entity)).or_insert(i);
            index.items.push(Some(entity));
        }
        index
    }

    pub fn empty() -> Self {
        EntityIndex {
            items: Vec::new(),
            by_origin: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    fn live(&self, slot: Option<&usize>) -> Option<usize> {
        slot.copied()
            .filter(|i| self.items.get(*i).is_some_and(Option::is_some))
    }

    /// Remove a matched entity so later candidates cannot match it again.
    pub fn claim(&mut self, slot: usize) -> Option<T> {
        self.items.get_mut(slot).and_then(Option::take)
    }
}

/// A pure lookup from a candidate to an index slot.
pub type MatchStrategy<T> = fn(&Candidate, &EntityIndex<T>) -> Option<usize>;

pub fn by_original_id<T>(candidate: &Candidate, index: &EntityIndex<T>) -> Option<usize> {
    index.live(index.by_origin.get(&candidate.original_id))
}

pub fn by_name<T>(candidate: &Candidate, index: &EntityIndex<T>) -> Option<usize> {
    index.live(index.by_name.get(&candidate.name_key))
}

/// Identity first, then name.
pub fn default_strategies<T>() -> Vec<(MatchedBy, MatchStrategy<T>)> {
    vec![
        (MatchedBy::OriginalId, by_original_id::<T> as MatchStrategy<T>),
        (MatchedBy::Name, by_name::<T> as MatchStrategy<T>),
    ]
}

/// Run the strategies in order and claim the first hit.
pub fn find_match<T>(
    candidate: &Candidate,
    index: &mut EntityIndex<T>,
    strategies: &[(MatchedBy, MatchStrategy<T>)],
) -> Option<(T, MatchedBy)> {
    let (slot, by) = strategies
        .iter()
        .find_map(|(by, strategy)| strategy(candidate, &*index).map(|slot| (slot, *by)))?;
    index.claim(slot).map(|entity| (entity, by))
}
