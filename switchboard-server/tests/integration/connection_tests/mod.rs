mod test_control_leave_ends_session;
mod test_disconnect_leaves_room;
