mod common;





#[cfg(test)]
mod test_deck_and_upgrades;
