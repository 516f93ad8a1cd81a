use std::{fmt, ops};
pub use self::index_map::{VarMap, LitVec, VarHeap};

pub mod assignment;
mod index_map;


#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Var(usize);

impl Var {
    #[inline]
    pub fn from_index(index: usize) -> Var {
        Var(index)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }

    #[inline]
    pub fn lit(&self, neg: bool) -> Lit {
        Lit((self.0 << 1) | (neg as usize))
    }

    #[inline]
    pub fn pos_lit(&self) -> Lit {
        Lit(self.0 << 1)
    }

    #[inline]
    pub fn neg_lit(&self) -> Lit {
        Lit((self.0 << 1) | 1)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x{}", self.0 + 1)
    }
}


#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct Lit(usize);

impl Lit {
    // true for the negative polarity
    #[inline]
    pub fn sign(&self) -> bool {
        (self.0 & 1) != 0
    }

    #[inline]
    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.sign() {
            write!(f, "-")?;
        }
        write!(f, "{:?}", self.var())
    }
}
