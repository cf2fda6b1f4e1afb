use rand::seq::SliceRandom;
use rand::Rng;

/// Returns a uniformly shuffled copy of `videos`. The input is left untouched.
pub fn shuffle_videos<T: Clone>(videos: &[T]) -> Vec<T> {
    shuffle_with(videos, &mut rand::thread_rng())
}

pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(videos: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = videos.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shuffle_is_a_permutation() {
        let videos: Vec<u32> = (0..200).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let mut shuffled = shuffle_with(&videos, &mut rng);
        assert_eq!(shuffled.len(), videos.len());
        assert_ne!(shuffled, videos);

        shuffled.sort_unstable();
        assert_eq!(shuffled, videos);
    }

    #[test]
    fn shuffle_keeps_duplicates() {
        let videos = vec!["a", "b", "a", "c", "a"];
        let mut shuffled = shuffle_videos(&videos);
        shuffled.sort_unstable();
        assert_eq!(shuffled, vec!["a", "a", "a", "b", "c"]);
    }

    #[test]
    fn shuffle_leaves_input_alone() {
        let videos = vec![1, 2, 3, 4];
        let _ = shuffle_videos(&videos);
        assert_eq!(videos, vec![1, 2, 3, 4]);
    }

    #[test]
    fn shuffle_trivial_inputs() {
        assert!(shuffle_videos::<u8>(&[]).is_empty());
        assert_eq!(shuffle_videos(&["only"]), vec!["only"]);
    }

    #[test]
    fn same_seed_same_order() {
        let videos: Vec<u32> = (0..50).collect();
        let a = shuffle_with(&videos, &mut StdRng::seed_from_u64(42));
        let b = shuffle_with(&videos, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
