pub mod mood_card;
pub mod primary_button;
