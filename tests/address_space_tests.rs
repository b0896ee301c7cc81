use memsim::error::SimError;
use memsim::memory::{
    address_space::AddressSpace,
    allocator::{AllocationStrategy, allocate, deallocate},
    block::MemoryBlock,
    index::AllocationIndex,
};

fn space_with(sizes: &[usize], total: usize) -> (AddressSpace, AllocationIndex) {
    let mut space = AddressSpace::new(total).unwrap();
    let mut index = AllocationIndex::new();
    for (i, &size) in sizes.iter().enumerate() {
        allocate(&mut space, &mut index, AllocationStrategy::FirstFit, i as u32 + 1, size).unwrap();
    }
    (space, index)
}

#[test]
fn test_new_space_is_one_free_block() {
    let space = AddressSpace::new(512).unwrap();
    assert_eq!(space.blocks(), &[MemoryBlock::free(0, 512)]);
    assert!(space.check_invariants().is_ok());
    let stats = space.stats();
    assert_eq!(stats.free, 512);
    assert_eq!(stats.used, 0);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.largest_free, 512);
}

#[test]
fn test_occupy_splits_remainder() {
    let mut space = AddressSpace::new(100).unwrap();
    let start = space.occupy(0, 30, 7).unwrap();
    assert_eq!(start, 0);
    assert_eq!(
        space.blocks(),
        &[MemoryBlock::owned(0, 30, 7), MemoryBlock::free(30, 70)]
    );
    assert!(space.check_invariants().is_ok());
}

#[test]
fn test_occupy_exact_fit_does_not_split() {
    let mut space = AddressSpace::new(100).unwrap();
    space.occupy(0, 100, 1).unwrap();
    assert_eq!(space.blocks(), &[MemoryBlock::owned(0, 100, 1)]);
    assert_eq!(space.stats().free_blocks, 0);
}

#[test]
fn test_position_of_uses_start_address() {
    let (space, _) = space_with(&[100, 50, 200], 512);
    assert_eq!(space.position_of(0), Some(0));
    assert_eq!(space.position_of(100), Some(1));
    assert_eq!(space.position_of(150), Some(2));
    assert_eq!(space.position_of(350), Some(3));
    assert_eq!(space.position_of(120), None);
}

#[test]
fn test_adjacent_frees_merge_into_one_block() {
    let (mut space, mut index) = space_with(&[100, 50, 200], 512);
    deallocate(&mut space, &mut index, 1).unwrap();
    deallocate(&mut space, &mut index, 2).unwrap();
    assert_eq!(
        space.blocks(),
        &[
            MemoryBlock::free(0, 150),
            MemoryBlock::owned(150, 200, 3),
            MemoryBlock::free(350, 162),
        ]
    );
    assert!(space.check_invariants().is_ok());
}

#[test]
fn test_free_between_two_free_blocks_merges_both_sides() {
    let (mut space, mut index) = space_with(&[100, 50, 200], 512);
    deallocate(&mut space, &mut index, 1).unwrap();
    deallocate(&mut space, &mut index, 3).unwrap();
    assert_eq!(space.stats().free_blocks, 2);
    deallocate(&mut space, &mut index, 2).unwrap();
    assert_eq!(space.blocks(), &[MemoryBlock::free(0, 512)]);
    assert!(index.is_empty());
}

#[test]
fn test_release_reports_merges() {
    let (mut space, _) = space_with(&[100, 50], 512);
    let (size, merged) = space.release(1);
    assert_eq!(size, 50);
    assert_eq!(merged.position, 1);
    assert_eq!(merged.merges, 1);
    assert_eq!(space.blocks().len(), 2);
}

#[test]
fn test_invariant_check_reports_violations() {
    let (mut space, _) = space_with(&[100], 512);
    space.occupy(1, 10, 1).unwrap();
    let err = space.check_invariants().unwrap_err();
    assert!(err.contains("more than one block"), "{}", err);
}

#[test]
fn test_zero_sized_space_is_rejected() {
    assert!(matches!(AddressSpace::new(0), Err(SimError::InvalidRequest(_))));
}

#[test]
fn test_occupy_rejects_bad_targets() {
    let (mut space, _) = space_with(&[100], 512);
    let before = space.blocks().to_vec();

    // owned block
    assert!(matches!(space.occupy(0, 10, 9), Err(SimError::InvalidRequest(_))));
    // larger than the free block
    assert!(matches!(space.occupy(1, 413, 9), Err(SimError::InvalidRequest(_))));
    assert!(matches!(space.occupy(1, 0, 9), Err(SimError::InvalidRequest(_))));
    assert!(matches!(space.occupy(5, 10, 9), Err(SimError::InvalidRequest(_))));
    assert_eq!(space.blocks(), before.as_slice());
}
