//! Type-level widths.
//!
//! Grid geometry is fixed per instantiation, so widths derived from it (lane count `R + C`, slot count `R * C`,
//! counter width `clog2(max(R * C, 2))`) are spelled as types and resolved to constants at monomorphization.

use std::fmt::Debug;
use std::marker::PhantomData;

use crate::clog2;

/// Type-level natural number.
pub trait Num: Debug + Clone + 'static {
    /// Width.
    const WIDTH: usize;
}

/// Usize number.
#[derive(Debug, Clone)]
pub struct U<const N: usize>;

impl<const N: usize> Num for U<N> {
    const WIDTH: usize = N;
}

/// Sum.
#[derive(Debug, Clone)]
pub struct Sum<L: Num, R: Num>(PhantomData<(L, R)>);

impl<L: Num, R: Num> Num for Sum<L, R> {
    const WIDTH: usize = L::WIDTH + R::WIDTH;
}

/// Product.
#[derive(Debug, Clone)]
pub struct Prod<L: Num, R: Num>(PhantomData<(L, R)>);

impl<L: Num, R: Num> Num for Prod<L, R> {
    const WIDTH: usize = L::WIDTH * R::WIDTH;
}

/// Maximum.
#[derive(Debug, Clone)]
pub struct Max<L: Num, R: Num>(PhantomData<(L, R)>);

impl<L: Num, R: Num> Num for Max<L, R> {
    const WIDTH: usize = if L::WIDTH > R::WIDTH { L::WIDTH } else { R::WIDTH };
}

/// Log2 (ceiling).
#[derive(Debug, Clone)]
pub struct Log2<N: Num>(PhantomData<N>);

impl<N: Num> Num for Log2<N> {
    const WIDTH: usize = clog2(N::WIDTH);
}

/// Width of a binary counter that indexes `N` slots. Never narrower than one bit.
pub type IndexWidth<N> = Log2<Max<N, U<2>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_widths() {
        assert_eq!(Sum::<U<2>, U<3>>::WIDTH, 5);
        assert_eq!(Prod::<U<4>, U<4>>::WIDTH, 16);
        assert_eq!(IndexWidth::<Prod<U<4>, U<4>>>::WIDTH, 4);
        assert_eq!(IndexWidth::<Prod<U<3>, U<3>>>::WIDTH, 4);
        assert_eq!(IndexWidth::<U<1>>::WIDTH, 1);
    }
}
