use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};

use tinydis::connection::Connection;
use tinydis::frame::Frame;

async fn create_tcp_connection() -> Result<(UnboundedSender<Vec<u8>>, TcpStream), std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            while let Some(data) = rx.recv().await {
                // Write the received channel data to the socket.
                if socket.write_all(&data).await.is_err() {
                    break;
                }
            }
        }
    });

    // Connect to the server as a client to complete the setup.
    let stream = TcpStream::connect(local_addr).await?;

    Ok((tx, stream))
}

fn request(parts: &[&str]) -> Frame {
    Frame::Array(
        parts
            .iter()
            .map(|part| Frame::Bulk(Bytes::from(part.to_string())))
            .collect(),
    )
}

#[tokio::test]
async fn test_parse_bulk_string() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"$5\r\nhello\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Bulk(Bytes::from("hello")));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parse_array() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    let bytes = b"*3\r\n$3\r\nSET\r\n$5\r\nmykey\r\n$7\r\nmyvalue\r\n";

    tcp_stream_tx.send(bytes.to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(request(&["SET", "mykey", "myvalue"]));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parse_null_bulk_string() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"$-1\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();

    assert_eq!(actual, Some(Frame::Null));
}

#[tokio::test]
async fn test_parse_multiple_commands_sequentially() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    let array_1 = b"*3\r\n$3\r\nSET\r\n$7\r\nmykey_1\r\n$9\r\nmyvalue_1\r\n";
    let array_2 = b"*2\r\n$3\r\nGET\r\n$7\r\nmykey_1\r\n";
    let empty_array = b"*0\r\n";
    let bulk_string = b"$5\r\nhello\r\n";

    tcp_stream_tx.send(array_1.to_vec()).unwrap();
    tcp_stream_tx.send(array_2.to_vec()).unwrap();
    tcp_stream_tx.send(empty_array.to_vec()).unwrap();
    tcp_stream_tx.send(bulk_string.to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(request(&["SET", "mykey_1", "myvalue_1"])));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(request(&["GET", "mykey_1"])));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Array(vec![])));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Bulk(Bytes::from("hello"))));
}

#[tokio::test]
async fn test_parse_incomplete_frame() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    // Command split into three parts to simulate partial/incomplete data sending.
    // "*3\r\n$3\r\nSET\r\n$5\r\nmykey\r\n$7\r\nmyvalue\r\n";
    let part1 = b"*3\r\n$3\r\nSE";
    let part2 = b"T\r\n$5\r\nmyke";
    let part3 = b"y\r\n$7\r\nmyvalue\r\n";

    tokio::spawn(async move {
        let parts = vec![part1.to_vec(), part2.to_vec(), part3.to_vec()];
        for part in parts {
            tcp_stream_tx.send(part).unwrap();
            // Simulate a delay in sending/receiving the data.
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    });

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(request(&["SET", "mykey", "myvalue"])));
}

#[tokio::test]
async fn test_parse_bulk_string_split_inside_payload() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tokio::spawn(async move {
        for part in [&b"*1\r\n$10\r\nhello"[..], &b"world"[..], &b"\r\n"[..]] {
            tcp_stream_tx.send(part.to_vec()).unwrap();
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }
    });

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(request(&["helloworld"])));
}

#[tokio::test]
async fn test_parse_unknown_type() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"%1\r\n".to_vec()).unwrap();

    let err = connection.read_frame().await.unwrap_err();
    assert_eq!(err.to_string(), "unknown value type: '%'");
}
