//! Boolean variable allocation.

use std::collections::HashMap;

use crate::Symbol;

/// The distance between the variable blocks of two names.
///
/// Each name owns a block of one stride: the real-package variable at the
/// base, the virtual-package variable at base + 1, the shared-library
/// variable at base + 2. The fourth slot of the block is spare.
const STRIDE: isize = 4;

/// Allocates Boolean solver variables for interned names.
///
/// For every name three variables exist: "the real package named N is
/// selected", "some provider supplies the virtual name N" and "the shared
/// library named N is available". All three live in one strided block, so
/// any of them resolves back to the originating name by masking the stride.
///
/// ## Examples
/// ```
/// use repodb_solve::{Interner, VariablePool};
///
/// let mut interner = Interner::new();
/// let mut pool = VariablePool::new();
/// let name = interner.intern("zlib-1.3_1");
/// let real = pool.real(name);
/// assert_eq!(pool.virt(name), real + 1);
/// assert_eq!(pool.shlib(name), real + 2);
/// assert_eq!(pool.origin(real + 2), Some(name));
/// ```
#[derive(Debug, Default)]
pub struct VariablePool {
    next_base: isize,
    bases: HashMap<Symbol, isize>,
    origins: HashMap<isize, Symbol>,
}

impl VariablePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the variable block base for a name, allocating one on first
    /// sight.
    fn base(&mut self, name: Symbol) -> isize {
        if let Some(&base) = self.bases.get(&name) {
            return base;
        }
        let base = self.fresh();
        self.bases.insert(name, base);
        self.origins.insert(base, name);
        base
    }

    /// Returns the variable "the real package named `name` is selected".
    pub fn real(&mut self, name: Symbol) -> isize {
        self.base(name)
    }

    /// Returns the variable "some provider supplies the virtual name
    /// `name`".
    pub fn virt(&mut self, name: Symbol) -> isize {
        self.base(name) + 1
    }

    /// Returns the virtual-package variable belonging to the same name as a
    /// real-package variable.
    pub fn virt_of(real: isize) -> isize {
        real + 1
    }

    /// Returns the variable "the shared library named `name` is available".
    pub fn shlib(&mut self, name: Symbol) -> isize {
        self.base(name) + 2
    }

    /// Allocates an anonymous variable block and returns its base.
    ///
    /// Anonymous blocks share the namespace of named blocks, so auxiliary
    /// variables (e.g. clause activation literals) can never collide with a
    /// named variable. [`VariablePool::origin`] returns `None` for them.
    pub fn aux(&mut self) -> isize {
        self.fresh()
    }

    /// Returns the name that owns the block a variable belongs to, or
    /// `None` for anonymous and unallocated blocks.
    pub fn origin(&self, variable: isize) -> Option<Symbol> {
        self.origins.get(&(variable - variable % STRIDE)).copied()
    }

    fn fresh(&mut self) -> isize {
        // variable numbering starts at one full stride, never at zero
        if self.next_base == 0 {
            self.next_base = STRIDE;
        }
        let base = self.next_base;
        self.next_base += STRIDE;
        base
    }
}

#[cfg(test)]
mod tests {
    use crate::Interner;

    use super::*;

    #[test]
    fn distinct_names_get_distinct_blocks() {
        let mut interner = Interner::new();
        let mut pool = VariablePool::new();
        let first = pool.real(interner.intern("a-1_1"));
        let second = pool.real(interner.intern("b-1_1"));
        assert_ne!(first, second);
        assert_eq!((second - first).abs() % STRIDE, 0);
    }

    #[test]
    fn all_three_kinds_round_trip_to_the_name() {
        let mut interner = Interner::new();
        let mut pool = VariablePool::new();
        let name = interner.intern("libz.so.1");
        let real = pool.real(name);
        let virt = pool.virt(name);
        let shlib = pool.shlib(name);
        assert_eq!(virt, VariablePool::virt_of(real));
        for variable in [real, virt, shlib] {
            assert_eq!(pool.origin(variable), Some(name));
        }
        assert_eq!(interner.resolve(pool.origin(shlib).unwrap()), "libz.so.1");
    }

    #[test]
    fn repeated_lookups_are_stable() {
        let mut interner = Interner::new();
        let mut pool = VariablePool::new();
        let name = interner.intern("a-1_1");
        assert_eq!(pool.real(name), pool.real(name));
        assert_eq!(pool.shlib(name), pool.shlib(name));
    }

    #[test]
    fn aux_blocks_have_no_origin() {
        let mut interner = Interner::new();
        let mut pool = VariablePool::new();
        let named = pool.real(interner.intern("a-1_1"));
        let aux = pool.aux();
        assert_ne!(aux, named);
        assert_eq!(pool.origin(aux), None);
    }

    #[test]
    fn unallocated_variables_have_no_origin() {
        let pool = VariablePool::new();
        assert_eq!(pool.origin(8), None);
    }
}
