use athenabuild::{
    BlockPosition, BlockState, BuildConfig, BuildError, BuildSessionManager, Edit, MemoryWorld,
    World,
};
use uuid::Uuid;

fn stone() -> BlockState {
    BlockState::new("minecraft:stone")
}

fn air() -> BlockState {
    BlockState::air()
}

fn pos(x: i32, y: i32, z: i32) -> BlockPosition {
    BlockPosition::new(x, y, z)
}

/// The canonical cycle: select a 2x2x2 of air, fill it with stone, undo back
/// to air, redo back to stone.
#[test]
fn fill_undo_redo_cycle() {
    let mut world = MemoryWorld::with_size((16, 16, 16));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    let region = manager
        .select(player, &world, pos(0, 0, 0), pos(1, 1, 1))
        .unwrap();
    assert_eq!(region.volume(), 8);

    manager
        .apply_operation(player, &mut world, Edit::Fill(stone()))
        .unwrap();
    for p in region.iter() {
        assert_eq!(world.block_at(p), Some(stone()), "fill missed {}", p);
    }

    manager.undo(player, &mut world).unwrap();
    for p in region.iter() {
        assert_eq!(world.block_at(p), Some(air()), "undo missed {}", p);
    }

    manager.redo(player, &mut world).unwrap();
    for p in region.iter() {
        assert_eq!(world.block_at(p), Some(stone()), "redo missed {}", p);
    }
}

/// Copy region A, paste over region B, undo: B returns to its prior contents
/// and the clipboard still holds A's contents (copy is non-destructive).
#[test]
fn copy_paste_undo_leaves_clipboard_intact() {
    let mut world = MemoryWorld::with_size((32, 16, 16));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    // Build a marker pattern in region A
    world.set_block(pos(0, 0, 0), &stone());
    world.set_block(pos(1, 1, 1), &BlockState::new("minecraft:glass"));

    manager
        .select(player, &world, pos(0, 0, 0), pos(1, 1, 1))
        .unwrap();
    assert_eq!(manager.copy(player, &world).unwrap(), 8);

    // Region B previously held dirt
    world.set_block(pos(10, 0, 0), &BlockState::new("minecraft:dirt"));
    manager
        .select(player, &world, pos(10, 0, 0), pos(11, 1, 1))
        .unwrap();
    manager
        .apply_operation(player, &mut world, Edit::Paste)
        .unwrap();

    assert_eq!(world.block_at(pos(10, 0, 0)), Some(stone()));
    assert_eq!(
        world.block_at(pos(11, 1, 1)),
        Some(BlockState::new("minecraft:glass"))
    );

    manager.undo(player, &mut world).unwrap();
    assert_eq!(
        world.block_at(pos(10, 0, 0)),
        Some(BlockState::new("minecraft:dirt"))
    );
    assert_eq!(world.block_at(pos(11, 1, 1)), Some(air()));

    // Source region untouched throughout, clipboard still pasteable
    assert_eq!(world.block_at(pos(0, 0, 0)), Some(stone()));
    manager
        .apply_operation(player, &mut world, Edit::Paste)
        .unwrap();
    assert_eq!(world.block_at(pos(10, 0, 0)), Some(stone()));
}

#[test]
fn applying_after_undo_clears_redo() {
    let mut world = MemoryWorld::with_size((16, 16, 16));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    manager
        .select(player, &world, pos(0, 0, 0), pos(1, 1, 1))
        .unwrap();
    manager
        .apply_operation(player, &mut world, Edit::Fill(stone()))
        .unwrap();
    manager.undo(player, &mut world).unwrap();

    // A fresh edit invalidates the redo branch
    manager
        .apply_operation(player, &mut world, Edit::Fill(BlockState::new("minecraft:glass")))
        .unwrap();
    assert_eq!(
        manager.redo(player, &mut world),
        Err(BuildError::NothingToRedo)
    );
}

#[test]
fn history_depth_evicts_oldest_entries() {
    let mut world = MemoryWorld::with_size((16, 16, 16));
    let config = BuildConfig {
        history_depth: 3,
        ..BuildConfig::default()
    };
    let mut manager = BuildSessionManager::new(config);
    let player = Uuid::new_v4();

    manager
        .select(player, &world, pos(0, 0, 0), pos(0, 0, 0))
        .unwrap();
    for i in 0..5 {
        let block = BlockState::new(format!("minecraft:block_{}", i));
        manager
            .apply_operation(player, &mut world, Edit::Fill(block))
            .unwrap();
    }

    // Only the newest three survive
    for _ in 0..3 {
        manager.undo(player, &mut world).unwrap();
    }
    assert_eq!(
        manager.undo(player, &mut world),
        Err(BuildError::NothingToUndo)
    );
    // The evicted edits can never be undone: the cell stays at the state the
    // oldest surviving entry captured.
    assert_eq!(
        world.block_at(pos(0, 0, 0)),
        Some(BlockState::new("minecraft:block_1"))
    );
}

#[test]
fn undo_and_redo_on_empty_history_fail_cleanly() {
    let mut world = MemoryWorld::with_size((8, 8, 8));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    manager
        .select(player, &world, pos(0, 0, 0), pos(2, 2, 2))
        .unwrap();
    let before = manager.selection(player).unwrap();

    assert_eq!(
        manager.undo(player, &mut world),
        Err(BuildError::NothingToUndo)
    );
    assert_eq!(
        manager.redo(player, &mut world),
        Err(BuildError::NothingToRedo)
    );

    // Selection survives the failed calls
    assert_eq!(manager.selection(player), Ok(before));
}

#[test]
fn paste_without_copy_fails_and_history_is_untouched() {
    let mut world = MemoryWorld::with_size((8, 8, 8));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    manager
        .select(player, &world, pos(0, 0, 0), pos(1, 1, 1))
        .unwrap();
    assert_eq!(
        manager.apply_operation(player, &mut world, Edit::Paste),
        Err(BuildError::EmptyClipboard)
    );
    assert_eq!(
        manager.undo(player, &mut world),
        Err(BuildError::NothingToUndo)
    );
}

#[test]
fn oversized_edit_is_rejected_before_touching_anything() {
    let mut world = MemoryWorld::with_size((32, 32, 32));
    let config = BuildConfig {
        max_edit_volume: 100,
        ..BuildConfig::default()
    };
    let mut manager = BuildSessionManager::new(config);
    let player = Uuid::new_v4();

    manager
        .select(player, &world, pos(0, 0, 0), pos(9, 9, 9))
        .unwrap();
    let result = manager.apply_operation(player, &mut world, Edit::Fill(stone()));
    assert!(matches!(result, Err(BuildError::OperationFailed(_))));

    assert_eq!(world.block_at(pos(0, 0, 0)), Some(air()));
    assert_eq!(
        manager.undo(player, &mut world),
        Err(BuildError::NothingToUndo)
    );
}

#[test]
fn selection_outside_world_bounds_is_invalid() {
    let world = MemoryWorld::with_size((16, 16, 16));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    assert_eq!(
        manager.select(player, &world, pos(0, 0, 0), pos(16, 0, 0)),
        Err(BuildError::InvalidSelection)
    );
    assert_eq!(manager.selection(player), Err(BuildError::NoSelection));
}

#[test]
fn selection_outside_configured_height_range_is_invalid() {
    // World is taller than the configured editable range
    let world = MemoryWorld::with_size((16, 64, 16));
    let config = BuildConfig {
        min_height: 0,
        max_height: 31,
        ..BuildConfig::default()
    };
    let mut manager = BuildSessionManager::new(config);
    let player = Uuid::new_v4();

    assert_eq!(
        manager.select(player, &world, pos(0, 0, 0), pos(0, 32, 0)),
        Err(BuildError::InvalidSelection)
    );
    assert!(manager.select(player, &world, pos(0, 0, 0), pos(0, 31, 0)).is_ok());
}

#[test]
fn overlapping_edit_is_rejected_not_queued() {
    let mut world = MemoryWorld::with_size((16, 16, 16));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    manager
        .select(player, &world, pos(0, 0, 0), pos(1, 1, 1))
        .unwrap();

    // Simulate an edit staged asynchronously by the host
    manager.session_for(player).begin_edit().unwrap();

    assert_eq!(
        manager.apply_operation(player, &mut world, Edit::Fill(stone())),
        Err(BuildError::OperationInProgress)
    );
    assert_eq!(
        manager.undo(player, &mut world),
        Err(BuildError::OperationInProgress)
    );

    // Once the staged edit finishes, the player can edit again
    manager.session_for(player).finish_edit();
    manager
        .apply_operation(player, &mut world, Edit::Fill(stone()))
        .unwrap();
    assert_eq!(world.block_at(pos(0, 0, 0)), Some(stone()));
}

#[test]
fn replace_only_rewrites_matching_cells_and_undo_restores_all() {
    let mut world = MemoryWorld::with_size((8, 8, 8));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    let dirt = BlockState::new("minecraft:dirt");
    world.set_block(pos(0, 0, 0), &stone());
    world.set_block(pos(1, 0, 0), &dirt);

    manager
        .select(player, &world, pos(0, 0, 0), pos(3, 0, 0))
        .unwrap();
    manager
        .apply_operation(
            player,
            &mut world,
            Edit::Replace {
                from: stone(),
                to: BlockState::new("minecraft:glass"),
            },
        )
        .unwrap();

    assert_eq!(
        world.block_at(pos(0, 0, 0)),
        Some(BlockState::new("minecraft:glass"))
    );
    assert_eq!(world.block_at(pos(1, 0, 0)), Some(dirt.clone()));
    assert_eq!(world.block_at(pos(2, 0, 0)), Some(air()));

    manager.undo(player, &mut world).unwrap();
    assert_eq!(world.block_at(pos(0, 0, 0)), Some(stone()));
    assert_eq!(world.block_at(pos(1, 0, 0)), Some(dirt));
}

#[test]
fn sessions_are_isolated_per_player() {
    let mut world = MemoryWorld::with_size((16, 16, 16));
    let mut manager = BuildSessionManager::default();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    manager
        .select(alice, &world, pos(0, 0, 0), pos(1, 1, 1))
        .unwrap();
    manager
        .apply_operation(alice, &mut world, Edit::Fill(stone()))
        .unwrap();

    // Bob has no selection and nothing to undo
    assert_eq!(manager.selection(bob), Err(BuildError::NoSelection));
    assert_eq!(manager.undo(bob, &mut world), Err(BuildError::NothingToUndo));

    // Alice's undo still works
    manager.undo(alice, &mut world).unwrap();
    assert_eq!(world.block_at(pos(0, 0, 0)), Some(air()));
}

#[test]
fn quit_releases_session_state() {
    let mut world = MemoryWorld::with_size((16, 16, 16));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    manager
        .select(player, &world, pos(0, 0, 0), pos(1, 1, 1))
        .unwrap();
    manager
        .apply_operation(player, &mut world, Edit::Fill(stone()))
        .unwrap();
    manager.copy(player, &world).unwrap();
    assert_eq!(manager.session_count(), 1);

    manager.handle_quit(player);
    assert_eq!(manager.session_count(), 0);

    // Rejoining starts from scratch; the world keeps its blocks
    manager.handle_join(player);
    assert_eq!(manager.selection(player), Err(BuildError::NoSelection));
    assert_eq!(
        manager.undo(player, &mut world),
        Err(BuildError::NothingToUndo)
    );
    assert_eq!(world.block_at(pos(0, 0, 0)), Some(stone()));
}

#[test]
fn clear_resets_cells_to_air() {
    let mut world = MemoryWorld::with_size((8, 8, 8));
    let mut manager = BuildSessionManager::default();
    let player = Uuid::new_v4();

    world.set_block(pos(2, 2, 2), &stone());
    manager
        .select(player, &world, pos(2, 2, 2), pos(3, 3, 3))
        .unwrap();
    manager
        .apply_operation(player, &mut world, Edit::Clear)
        .unwrap();
    assert_eq!(world.block_at(pos(2, 2, 2)), Some(air()));

    manager.undo(player, &mut world).unwrap();
    assert_eq!(world.block_at(pos(2, 2, 2)), Some(stone()));
}
