use rand::{prelude::*, rngs::SmallRng, seq::index};
use rand_distr::{Distribution, Uniform};

/// Every random choice of a run is drawn from one of these, so a seed fixes the whole run.
pub fn small_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Uniform index into a collection of `len` items. Consumes no randomness when `len == 0`.
pub fn choose_index<R: Rng>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }

    Some(Uniform::from(0..len).sample(rng))
}

pub fn choose<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    choose_index(rng, items.len()).map(|i| &items[i])
}

/// Removes and returns a uniformly chosen item. The order of the rest is not preserved.
pub fn take<T, R: Rng>(rng: &mut R, items: &mut Vec<T>) -> Option<T> {
    choose_index(rng, items.len()).map(|i| items.swap_remove(i))
}

/// `amount` distinct indices below `len`, in ascending order.
pub fn sample_distinct<R: Rng>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    let mut picked = index::sample(rng, len, amount.min(len)).into_vec();
    picked.sort_unstable();

    picked
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_choices() {
        let items: Vec<u32> = (0..100).collect();
        let mut r1 = small_rng(42);
        let mut r2 = small_rng(42);

        for _ in 0..20 {
            assert_eq!(choose(&mut r1, &items), choose(&mut r2, &items));
        }
    }

    #[test]
    fn test_empty_choice_draws_nothing() {
        let mut r1 = small_rng(7);
        let mut r2 = small_rng(7);
        let empty: [u8; 0] = [];

        assert_eq!(choose(&mut r1, &empty), None);
        assert_eq!(r1.gen::<u64>(), r2.gen::<u64>());
    }

    #[test]
    fn test_take_and_sample_distinct() {
        let mut rng = small_rng(3);
        let mut items = vec![1, 2, 3];
        let taken = take(&mut rng, &mut items).unwrap();
        assert_eq!(items.len(), 2);
        assert!(!items.contains(&taken));

        let picked = sample_distinct(&mut rng, 10, 4);
        assert_eq!(picked.len(), 4);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sample_distinct(&mut rng, 2, 5).len(), 2);
    }
}
