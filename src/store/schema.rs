pub const SCHEMA: &str = r#"
-- Annual objectives; soft-deleted so historical links stay resolvable
CREATE TABLE IF NOT EXISTS goals (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    year INTEGER NOT NULL,
    description TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Habits carry only identity and display fields; rules live in versions
CREATE TABLE IF NOT EXISTS habits (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    order_index INTEGER NOT NULL DEFAULT 0,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Time-scoped habit rules, one per habit per starting Monday
CREATE TABLE IF NOT EXISTS habit_versions (
    id TEXT PRIMARY KEY,
    habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    weekly_target INTEGER NOT NULL CHECK (weekly_target >= 1),
    requires_text_on_completion INTEGER NOT NULL DEFAULT 0,
    linked_goal_id TEXT REFERENCES goals(id),
    description TEXT,
    effective_week_start TEXT NOT NULL,  -- YYYY-MM-DD, always a Monday
    created_at TEXT DEFAULT (datetime('now')),

    UNIQUE(habit_id, effective_week_start)
);

-- Completions; several per habit per day are allowed
CREATE TABLE IF NOT EXISTS habit_completions (
    id TEXT PRIMARY KEY,
    habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    date TEXT NOT NULL,  -- YYYY-MM-DD
    text TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_goals_year ON goals(year);
CREATE INDEX IF NOT EXISTS idx_habits_order ON habits(order_index);
CREATE INDEX IF NOT EXISTS idx_habit_versions_habit ON habit_versions(habit_id);
CREATE INDEX IF NOT EXISTS idx_habit_completions_date ON habit_completions(date);
CREATE INDEX IF NOT EXISTS idx_habit_completions_habit_date ON habit_completions(habit_id, date);
"#;
