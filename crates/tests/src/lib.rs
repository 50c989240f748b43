#[cfg(test)]
mod common;

#[cfg(test)]
mod session_store_tests;

#[cfg(test)]
mod sign_up_tests;

#[cfg(test)]
mod supersede_tests;

#[cfg(test)]
mod profile_resolver_tests;

#[cfg(test)]
mod gate_scenario_tests;
