mod executor;
mod session_state;
mod state_machine;
