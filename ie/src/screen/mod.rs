pub mod dungeon_event;
