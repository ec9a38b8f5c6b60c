mod test_broadcast_to_viewers;
mod test_stream_chat;
