//! A hierarchical radial marking menu.
//!
//! [`menu::parse`] builds a [`menu::Menu`] from item definitions. The host
//! attaches [`config::Settings`] and an event channel to the root, calls
//! [`menu::Menu::init`], then feeds pointer input and clock ticks. Selections
//! and navigation come back as [`events::MenuEvent`]s on the channel, and
//! [`render::draw`] paints the current frame onto any [`render::Canvas`].

pub mod animation;
pub mod config;
pub mod events;
pub mod menu;
pub mod pointer;
pub mod render;
