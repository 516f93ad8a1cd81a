use std::{marker, ops};
use vec_map::VecMap;
use super::{Lit, Var};


pub type VarMap<V> = IdxMap<Var, V>;
pub type LitVec<V> = IdxVec<Lit, V>;
pub type VarHeap = IdxHeap<Var>;


pub trait Idx: Copy {
    fn idx(&self) -> usize;
    fn unidx(_: usize) -> Self;
}

impl Idx for Var {
    #[inline]
    fn idx(&self) -> usize {
        self.index()
    }

    #[inline]
    fn unidx(idx: usize) -> Var {
        Var::from_index(idx)
    }
}

impl Idx for Lit {
    #[inline]
    fn idx(&self) -> usize {
        self.index()
    }

    #[inline]
    fn unidx(idx: usize) -> Lit {
        Var::from_index(idx >> 1).lit(idx & 1 != 0)
    }
}


pub struct IdxMap<K: Idx, V> {
    map: VecMap<V>,
    ph: marker::PhantomData<K>,
}

impl<K: Idx, V> IdxMap<K, V> {
    pub fn new() -> Self {
        IdxMap {
            map: VecMap::new(),
            ph: marker::PhantomData,
        }
    }

    #[inline]
    pub fn insert(&mut self, k: &K, v: V) -> Option<V> {
        self.map.insert(k.idx(), v)
    }

    #[inline]
    pub fn get(&self, k: &K) -> Option<&V> {
        self.map.get(k.idx())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.map.iter().map(|(idx, v)| (K::unidx(idx), v))
    }
}

impl<'r, K: Idx, V> ops::Index<&'r K> for IdxMap<K, V> {
    type Output = V;

    #[inline]
    fn index(&self, k: &'r K) -> &V {
        &self.map[k.idx()]
    }
}


// Dense vector keyed by Var/Lit; `init` grows it up to the given key.
pub struct IdxVec<K: Idx, V> {
    vec: Vec<V>,
    ph: marker::PhantomData<K>,
}

impl<K: Idx, V: Default> IdxVec<K, V> {
    pub fn new() -> Self {
        IdxVec {
            vec: Vec::new(),
            ph: marker::PhantomData,
        }
    }

    #[inline]
    pub fn init(&mut self, k: K) {
        while self.vec.len() <= k.idx() {
            self.vec.push(V::default());
        }
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.vec.iter_mut()
    }
}

impl<K: Idx, V> ops::Index<K> for IdxVec<K, V> {
    type Output = V;

    #[inline]
    fn index(&self, k: K) -> &V {
        &self.vec[k.idx()]
    }
}

impl<K: Idx, V> ops::IndexMut<K> for IdxVec<K, V> {
    #[inline]
    fn index_mut(&mut self, k: K) -> &mut V {
        &mut self.vec[k.idx()]
    }
}


// Binary max-heap with an O(1) membership index. The ordering is injected
// into every operation as a `before` predicate so the heap mechanics stay
// independent of the activity table they usually close over.
pub struct IdxHeap<K: Idx> {
    heap: Vec<K>,
    index: VecMap<usize>,
}

impl<K: Idx> IdxHeap<K> {
    pub fn new() -> Self {
        IdxHeap {
            heap: Vec::new(),
            index: VecMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key.idx())
    }

    pub fn insert<F: Fn(&K, &K) -> bool>(&mut self, key: K, before: F) -> bool {
        if self.index.contains_key(key.idx()) {
            return false;
        }
        let place = self.heap.len();
        self.heap.push(key);
        self.index.insert(key.idx(), place);
        self.sift_up(place, before);
        true
    }

    pub fn pop<F: Fn(&K, &K) -> bool>(&mut self, before: F) -> Option<K> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        self.index.remove(top.idx());
        if !self.heap.is_empty() {
            self.index.insert(self.heap[0].idx(), 0);
            self.sift_down(0, before);
        }
        Some(top)
    }

    // Activity only grows on bump, so restoring the heap property after an
    // update never needs more than a sift-up.
    pub fn update<F: Fn(&K, &K) -> bool>(&mut self, key: &K, before: F) -> bool {
        match self.index.get(key.idx()) {
            None => false,
            Some(&place) => {
                self.sift_up(place, before);
                true
            }
        }
    }

    fn sift_up<F: Fn(&K, &K) -> bool>(&mut self, mut i: usize, before: F) {
        while i > 0 {
            let p = (i - 1) >> 1;
            if !before(&self.heap[i], &self.heap[p]) {
                break;
            }
            self.heap.swap(i, p);
            self.index.insert(self.heap[i].idx(), i);
            self.index.insert(self.heap[p].idx(), p);
            i = p;
        }
    }

    fn sift_down<F: Fn(&K, &K) -> bool>(&mut self, mut i: usize, before: F) {
        loop {
            let l = 2 * i + 1;
            if l >= self.heap.len() {
                break;
            }
            let r = l + 1;
            let c = if r < self.heap.len() && before(&self.heap[r], &self.heap[l]) {
                r
            } else {
                l
            };
            if !before(&self.heap[c], &self.heap[i]) {
                break;
            }
            self.heap.swap(c, i);
            self.index.insert(self.heap[i].idx(), i);
            self.index.insert(self.heap[c].idx(), c);
            i = c;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::formula::Var;

    fn check_heap_property(heap: &IdxHeap<Var>, act: &[f64]) {
        for i in 1..heap.heap.len() {
            let p = (i - 1) >> 1;
            assert!(
                act[heap.heap[p].idx()] >= act[heap.heap[i].idx()],
                "heap property violated at {}",
                i
            );
        }
        for (i, v) in heap.heap.iter().enumerate() {
            assert_eq!(heap.index.get(v.idx()), Some(&i));
        }
    }

    #[test]
    fn ordered_by_injected_comparator() {
        let act = [3.0, 1.0, 4.0, 1.5, 9.0, 2.6];
        let mut heap = IdxHeap::new();
        for i in 0..act.len() {
            heap.insert(Var::from_index(i), |a: &Var, b: &Var| act[a.idx()] > act[b.idx()]);
        }
        check_heap_property(&heap, &act);

        let order: Vec<usize> = (0..act.len())
            .map(|_| {
                heap.pop(|a: &Var, b: &Var| act[a.idx()] > act[b.idx()])
                    .unwrap()
                    .idx()
            })
            .collect();
        assert_eq!(order, vec![4, 2, 0, 5, 3, 1]);
        assert!(heap.pop(|a: &Var, b: &Var| act[a.idx()] > act[b.idx()]).is_none());
    }

    #[test]
    fn membership_tracks_inserts_and_pops() {
        let mut act = [1.0, 2.0, 3.0, 4.0];
        let mut heap = IdxHeap::new();
        for i in 0..act.len() {
            heap.insert(Var::from_index(i), |a: &Var, b: &Var| act[a.idx()] > act[b.idx()]);
        }
        assert!(!heap.insert(Var::from_index(2), |a: &Var, b: &Var| act[a.idx()] > act[b.idx()]));

        let top = heap.pop(|a: &Var, b: &Var| act[a.idx()] > act[b.idx()]).unwrap();
        assert_eq!(top.idx(), 3);
        assert!(!heap.contains(&top));
        assert!(heap.contains(&Var::from_index(0)));

        // bump and resift
        act[0] = 10.0;
        heap.update(&Var::from_index(0), |a: &Var, b: &Var| act[a.idx()] > act[b.idx()]);
        check_heap_property(&heap, &act);
        assert_eq!(
            heap.pop(|a: &Var, b: &Var| act[a.idx()] > act[b.idx()]).unwrap().idx(),
            0
        );
    }
}
