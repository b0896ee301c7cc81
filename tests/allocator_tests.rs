use memsim::error::SimError;
use memsim::memory::{
    address_space::AddressSpace,
    allocator::{AllocationStrategy, BestFit, FirstFit, Placement, allocate, deallocate},
    block::MemoryBlock,
    index::AllocationIndex,
};

/// Two holes of different sizes: 60 at 100 and 48 at 200, plus a 164 tail.
fn two_gaps(strategy: AllocationStrategy) -> (AddressSpace, AllocationIndex) {
    let mut space = AddressSpace::new(512).unwrap();
    let mut index = AllocationIndex::new();
    for (pid, size) in [(1, 100), (2, 60), (3, 40), (4, 48), (5, 100)] {
        allocate(&mut space, &mut index, strategy, pid, size).unwrap();
    }
    deallocate(&mut space, &mut index, 2).unwrap();
    deallocate(&mut space, &mut index, 4).unwrap();
    (space, index)
}

#[test]
fn test_first_fit_takes_earliest_gap() {
    let (mut space, mut index) = two_gaps(AllocationStrategy::FirstFit);
    let at = allocate(&mut space, &mut index, AllocationStrategy::FirstFit, 6, 45).unwrap();
    assert_eq!(at, 100);
    assert_eq!(space.blocks()[2], MemoryBlock::free(145, 15));
    assert!(space.check_invariants().is_ok());
}

#[test]
fn test_best_fit_takes_smallest_gap() {
    let (mut space, mut index) = two_gaps(AllocationStrategy::BestFit);
    let at = allocate(&mut space, &mut index, AllocationStrategy::BestFit, 6, 45).unwrap();
    assert_eq!(at, 200);
    assert_eq!(index.start_of(6), Some(200));
    assert!(space.check_invariants().is_ok());
}

#[test]
fn test_best_fit_tie_goes_to_lowest_address() {
    let mut space = AddressSpace::new(300).unwrap();
    let mut index = AllocationIndex::new();
    for (pid, size) in [(1, 50), (2, 10), (3, 50), (4, 10)] {
        allocate(&mut space, &mut index, AllocationStrategy::FirstFit, pid, size).unwrap();
    }
    deallocate(&mut space, &mut index, 1).unwrap();
    deallocate(&mut space, &mut index, 3).unwrap();
    // free: 50@0, 50@60, 180@120
    assert_eq!(BestFit.choose(space.blocks(), 50), Some(0));
    assert_eq!(FirstFit.choose(space.blocks(), 51), Some(4));
}

#[test]
fn test_gap_reuse_script() {
    for strategy in [AllocationStrategy::FirstFit, AllocationStrategy::BestFit] {
        let mut space = AddressSpace::new(512).unwrap();
        let mut index = AllocationIndex::new();
        allocate(&mut space, &mut index, strategy, 1, 100).unwrap();
        allocate(&mut space, &mut index, strategy, 2, 50).unwrap();
        allocate(&mut space, &mut index, strategy, 3, 200).unwrap();
        deallocate(&mut space, &mut index, 2).unwrap();
        let at = allocate(&mut space, &mut index, strategy, 4, 40).unwrap();
        assert_eq!(at, 100, "{}", strategy);
    }
}

#[test]
fn test_insufficient_memory_leaves_space_unchanged() {
    let mut space = AddressSpace::new(512).unwrap();
    let mut index = AllocationIndex::new();
    allocate(&mut space, &mut index, AllocationStrategy::FirstFit, 1, 100).unwrap();
    allocate(&mut space, &mut index, AllocationStrategy::FirstFit, 2, 50).unwrap();
    allocate(&mut space, &mut index, AllocationStrategy::FirstFit, 3, 200).unwrap();
    deallocate(&mut space, &mut index, 2).unwrap();
    let before = space.blocks().to_vec();

    // 212 units are free in total, but the largest hole is 162.
    let err = allocate(&mut space, &mut index, AllocationStrategy::FirstFit, 4, 200).unwrap_err();
    assert_eq!(
        err,
        SimError::InsufficientMemory {
            requested: 200,
            largest_free: 162
        }
    );
    assert_eq!(space.blocks(), before.as_slice());
    assert!(!index.contains(4));
}

#[test]
fn test_deallocate_unknown_process() {
    let mut space = AddressSpace::new(64).unwrap();
    let mut index = AllocationIndex::new();
    allocate(&mut space, &mut index, AllocationStrategy::FirstFit, 1, 16).unwrap();
    let before = space.blocks().to_vec();
    assert_eq!(
        deallocate(&mut space, &mut index, 9),
        Err(SimError::ProcessNotFound(9))
    );
    assert_eq!(space.blocks(), before.as_slice());
    assert!(index.agrees_with(&space));
}

#[test]
fn test_strategy_parsing() {
    assert_eq!("ff".parse::<AllocationStrategy>(), Ok(AllocationStrategy::FirstFit));
    assert_eq!("Best-Fit".parse::<AllocationStrategy>(), Ok(AllocationStrategy::BestFit));
    assert!("worst".parse::<AllocationStrategy>().is_err());
}
