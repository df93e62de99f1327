//! gridpilot-engine - Spreadsheet primitives shared by the whole workspace.

pub mod sheet;
