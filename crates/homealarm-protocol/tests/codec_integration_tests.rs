//! Integration tests for AlarmCodec with Tokio streams.
//!
//! These tests drive the codec through `Framed` halves over an in-memory
//! duplex pipe, covering outbound encoding, inbound framing and recovery
//! from malformed input.

use futures::{SinkExt, StreamExt};
use homealarm_core::{Delimiters, Device, SwitchValue};
use homealarm_protocol::{AlarmCodec, Command};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio_util::codec::{Framed, FramedRead, FramedWrite};

/// Helper function to create a framed duplex stream for testing.
fn create_framed_duplex(
    buffer_size: usize,
) -> (Framed<DuplexStream, AlarmCodec>, Framed<DuplexStream, AlarmCodec>) {
    let (client, server) = tokio::io::duplex(buffer_size);
    (
        Framed::new(client, AlarmCodec::new()),
        Framed::new(server, AlarmCodec::new()),
    )
}

#[tokio::test]
async fn test_codec_roundtrip_switch_command() {
    let (mut client, mut server) = create_framed_duplex(1024);

    let cmd = Command::switch(Device::LedGreen, SwitchValue::On);
    client.send(cmd.clone()).await.unwrap();

    let frame = server.next().await.unwrap().unwrap();
    assert_eq!(Command::try_from(frame).unwrap(), cmd);
}

#[tokio::test]
async fn test_set_led_wire_bytes() {
    let (client, mut server) = tokio::io::duplex(64);
    let mut writer = FramedWrite::new(client, AlarmCodec::new());

    writer
        .send(Command::switch(Device::LedGreen, SwitchValue::On))
        .await
        .unwrap();
    drop(writer);

    let mut wire = Vec::new();
    server.read_to_end(&mut wire).await.unwrap();
    assert_eq!(wire, b">1 27 1<");
}

#[tokio::test]
async fn test_call_sequence_wire_bytes() {
    let (client, mut server) = tokio::io::duplex(256);
    let mut writer = FramedWrite::new(client, AlarmCodec::new());

    for cmd in [
        Command::text(Device::PhoneNum, "110"),
        Command::text(Device::PhoneType, "police"),
        Command::text(Device::PhoneArea, "cn"),
    ] {
        writer.send(cmd).await.unwrap();
    }
    drop(writer);

    let mut wire = String::new();
    server.read_to_string(&mut wire).await.unwrap();
    assert_eq!(wire, ">3 29 110<>3 30 police<>3 31 cn<");
}

#[tokio::test]
async fn test_partial_writes_are_reassembled() {
    let (mut peer, local) = tokio::io::duplex(64);
    let mut reader = FramedRead::new(local, AlarmCodec::new());

    tokio::spawn(async move {
        for chunk in [&b">2 2"[..], b"2 2", b"1.5", b"<>0", b" 3 <"] {
            peer.write_all(chunk).await.unwrap();
            peer.flush().await.unwrap();
            tokio::task::yield_now().await;
        }
    });

    let first = reader.next().await.unwrap().unwrap();
    let second = reader.next().await.unwrap().unwrap();
    assert_eq!(first.as_bytes(), b"2 22 21.5");
    assert_eq!(second.as_bytes(), b"0 3 ");
    assert!(reader.next().await.is_none());
}

#[tokio::test]
async fn test_stream_continues_after_malformed_frame() {
    let (mut peer, local) = tokio::io::duplex(64);
    let mut reader = FramedRead::new(local, AlarmCodec::new());

    peer.write_all(b"><>1<>0 12 <").await.unwrap();
    drop(peer);

    let mut decoded = Vec::new();
    let mut malformed = 0;
    while let Some(frame) = reader.next().await {
        match Command::try_from(frame.unwrap()) {
            Ok(cmd) => decoded.push(cmd),
            Err(_) => malformed += 1,
        }
    }

    assert_eq!(malformed, 2);
    assert_eq!(decoded, [Command::decode("0 12 ").unwrap()]);
}

#[tokio::test]
async fn test_custom_delimiters_both_directions() {
    let delimiters = Delimiters::new("{", "}").unwrap();
    let (client, server) = tokio::io::duplex(256);
    let mut client = Framed::new(client, AlarmCodec::with_delimiters(delimiters.clone()));
    let mut server = Framed::new(server, AlarmCodec::with_delimiters(delimiters));

    client
        .send(Command::for_device(Device::Water2, "1"))
        .await
        .unwrap();

    let frame = server.next().await.unwrap().unwrap();
    assert_eq!(frame.as_bytes(), b"1 19 1");
}
