#![cfg(not(loom))]

use std::sync::Arc;
use std::sync::Barrier;
use std::thread;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use tagmap::Registry;
use tagmap::Tag;
use tagmap::TagMap;
use tagmap::garbage::CollectorWeak;
use tagmap::garbage::collector::Leak;
use tagmap::garbage::collector::Sdd;

const THREADS: usize = 8;
const TAGS: usize = 32;

#[cfg(feature = "slow")]
const ROUNDS: usize = 200_000;

#[cfg(not(feature = "slow"))]
const ROUNDS: usize = 5_000;

/// A value that records which slot it was written to.
///
/// Any value read back from slot `tag` must carry that same tag, otherwise a
/// write landed in the wrong slot or a torn value was observed.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Stamp {
  tag: Tag,
  thread: usize,
  round: usize,
  payload: String,
}

impl Stamp {
  fn new(tag: Tag, thread: usize, round: usize) -> Self {
    Self {
      tag,
      thread,
      round,
      payload: format!("{}:{thread}:{round}", tag.into_bits()),
    }
  }

  fn verify(&self, tag: Tag) {
    assert_eq!(self.tag, tag, "value read from the wrong slot");
    assert_eq!(
      self.payload,
      format!("{}:{}:{}", tag.into_bits(), self.thread, self.round),
      "torn value",
    );
  }
}

fn registry() -> Arc<Registry> {
  Arc::new((0..TAGS).map(|index| format!("tag{index}")).collect())
}

fn run_mixed<C>()
where
  C: CollectorWeak,
{
  let map: TagMap<Stamp, C> = TagMap::new(registry());
  let barrier: Barrier = Barrier::new(THREADS);

  thread::scope(|scope| {
    for thread in 0..THREADS {
      let map: &TagMap<Stamp, C> = &map;
      let barrier: &Barrier = &barrier;

      scope.spawn(move || {
        let mut rng: SmallRng = SmallRng::seed_from_u64(thread as u64);

        barrier.wait();

        for round in 0..ROUNDS {
          let tag: Tag = Tag::from_bits(rng.random_range(0..TAGS as u32));

          match rng.random_range(0..6) {
            0 => {
              map.set(tag, Stamp::new(tag, thread, round));
            }
            1 => {
              let (value, _): (Stamp, bool) = map.get_or_set(tag, Stamp::new(tag, thread, round));
              value.verify(tag);
            }
            2 => {
              if let Some(value) = map.get_and_delete(tag) {
                value.verify(tag);
              }
            }
            3 => {
              map.delete(tag);
            }
            4 => {
              if let Some(value) = map.get(tag) {
                value.verify(tag);
              }
            }
            _ => {
              for (tag, value) in map.values_by_tag() {
                value.verify(tag);
              }
            }
          }
        }
      });
    }
  });

  for (tag, value) in map.values_by_tag() {
    value.verify(tag);
  }

  assert!(map.len() <= TAGS);

  C::flush();
}

#[test]
fn test_mixed_operations_sdd() {
  run_mixed::<Sdd>();
}

#[test]
fn test_mixed_operations_leak() {
  run_mixed::<Leak>();
}

#[test]
fn test_get_or_set_race() {
  let map: TagMap<usize> = TagMap::new(registry());
  let barrier: Barrier = Barrier::new(THREADS);

  let results: Vec<Vec<(usize, bool)>> = thread::scope(|scope| {
    let handles: Vec<_> = (0..THREADS)
      .map(|thread| {
        let map: &TagMap<usize> = &map;
        let barrier: &Barrier = &barrier;

        scope.spawn(move || {
          barrier.wait();

          (0..TAGS)
            .map(|index| map.get_or_set(Tag::from_bits(index as u32), thread))
            .collect::<Vec<(usize, bool)>>()
        })
      })
      .collect();

    handles
      .into_iter()
      .map(|handle| handle.join().unwrap())
      .collect()
  });

  for index in 0..TAGS {
    let stored: Option<usize> = map.get(Tag::from_bits(index as u32));
    let winners: usize = results
      .iter()
      .filter(|per_thread| !per_thread[index].1)
      .count();

    assert_eq!(winners, 1, "exactly one thread stores into slot {index}");

    for per_thread in &results {
      assert_eq!(Some(per_thread[index].0), stored);
    }
  }
}

#[test]
fn test_readers_during_replacement() {
  let map: TagMap<Vec<usize>> = TagMap::new(registry());
  let tag: Tag = map.tag_by_name("tag0");

  map.set(tag, vec![0; 64]);

  thread::scope(|scope| {
    scope.spawn(|| {
      for round in 1..ROUNDS {
        map.set(tag, vec![round; 64]);
      }
    });

    for _ in 0..THREADS - 1 {
      scope.spawn(|| {
        for _ in 0..ROUNDS {
          let uniform: Option<bool> =
            map.with(tag, |values| values.iter().all(|value| *value == values[0]));

          assert_eq!(uniform, Some(true));
        }
      });
    }
  });
}
