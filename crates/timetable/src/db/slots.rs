//! Daily time slots, seeded with a default bell schedule.

use rusqlite::{params, Connection, Result};
use tracing::info;

use super::{generate_id, NewTimeSlot, SlotType, TimeSlot, TimetableDb, SLOT_LIST_LIMIT};

/// The default day: six class periods with a break and a lunch period.
const DEFAULT_SLOTS: [(&str, &str, i32, SlotType); 8] = [
    ("09:00", "10:00", 1, SlotType::Class),
    ("10:00", "11:00", 2, SlotType::Class),
    ("11:00", "11:30", 0, SlotType::Break),
    ("11:30", "12:30", 3, SlotType::Class),
    ("12:30", "13:30", 4, SlotType::Class),
    ("13:30", "14:30", 0, SlotType::Lunch),
    ("14:30", "15:30", 5, SlotType::Class),
    ("15:30", "16:30", 6, SlotType::Class),
];

/// Builds the default slots with freshly generated ids.
fn default_time_slots() -> Vec<TimeSlot> {
    DEFAULT_SLOTS
        .iter()
        .map(|&(start, end, period, slot_type)| TimeSlot {
            slot_id: generate_id("slot"),
            start_time: start.to_string(),
            end_time: end.to_string(),
            period_number: period,
            slot_type,
        })
        .collect()
}

impl TimetableDb {
    /// Lists time slots. An empty collection is seeded with the default
    /// slots first, so the first reader always sees a usable day.
    pub fn list_time_slots(&self) -> Result<Vec<TimeSlot>> {
        let db = self.conn();

        let slots = query_time_slots(&db)?;
        if !slots.is_empty() {
            return Ok(slots);
        }

        let defaults = default_time_slots();
        for slot in &defaults {
            insert_time_slot(&db, slot)?;
        }
        info!("Seeded {} default time slots", defaults.len());

        Ok(defaults)
    }

    pub fn insert_time_slot(&self, new: NewTimeSlot) -> Result<TimeSlot> {
        let slot = TimeSlot {
            slot_id: generate_id("slot"),
            start_time: new.start_time,
            end_time: new.end_time,
            period_number: new.period_number,
            slot_type: new.slot_type,
        };

        insert_time_slot(&self.conn(), &slot)?;
        Ok(slot)
    }

    pub fn delete_time_slot(&self, slot_id: &str) -> Result<bool> {
        self.delete_by_id("time_slots", "slot_id", slot_id)
    }
}

fn query_time_slots(db: &Connection) -> Result<Vec<TimeSlot>> {
    let mut stmt = db.prepare(
        "SELECT slot_id, start_time, end_time, period_number, slot_type
         FROM time_slots ORDER BY rowid LIMIT ?1",
    )?;

    let slots = stmt.query_map([SLOT_LIST_LIMIT], |row| {
        Ok(TimeSlot {
            slot_id: row.get(0)?,
            start_time: row.get(1)?,
            end_time: row.get(2)?,
            period_number: row.get(3)?,
            slot_type: row.get(4)?,
        })
    })?;

    slots.collect()
}

fn insert_time_slot(db: &Connection, slot: &TimeSlot) -> Result<()> {
    db.execute(
        "INSERT INTO time_slots (slot_id, start_time, end_time, period_number, slot_type)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            slot.slot_id,
            slot.start_time,
            slot.end_time,
            slot.period_number,
            slot.slot_type
        ],
    )?;
    Ok(())
}
