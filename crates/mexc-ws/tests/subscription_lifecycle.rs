//! Subscription lifecycle tests against a scripted mock server
//!
//! Every test drives a real `StreamClient` (connection driver included) over
//! `MockTransport`, acting as the exchange from the server handle.

use mexc_types::{CurrencyPair, Interval, MexcError, Ohlc, Topic};
use mexc_ws::{
    ConnectionConfig, ConnectionState, Endpoint, EventHandler, Hooks, MockServer, MockTransport,
    ReconnectConfig, RequestId, StreamClient, SubscriptionEvent, SubscriptionState,
};
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn config() -> ConnectionConfig {
    ConnectionConfig::new()
        .with_endpoint(Endpoint::Custom("wss://mock.test".into()))
        .with_reconnect(ReconnectConfig::fixed(Duration::from_millis(10)))
        .with_timeout(Duration::from_secs(1))
}

fn client_with(config: ConnectionConfig, hooks: Hooks) -> (StreamClient, MockServer) {
    let (transport, server) = MockTransport::pair("wss://mock.test");
    (StreamClient::with_transport(config, Box::new(transport), hooks), server)
}

fn client() -> (StreamClient, MockServer) {
    client_with(config(), Hooks::new())
}

fn btc() -> Topic {
    Topic::kline(CurrencyPair::new("BTC", "USDT"), Interval::Min1)
}

fn eth() -> Topic {
    Topic::kline(CurrencyPair::new("ETH", "USDT"), Interval::Min5)
}

fn collector(topic: &Topic) -> (EventHandler, Arc<Mutex<Vec<Ohlc>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let Topic::Kline { pair, interval } = topic.clone() else {
        panic!("kline topic expected");
    };
    let handler = EventHandler::kline(pair, interval, move |ohlc| sink.lock().push(ohlc));
    (handler, seen)
}

fn kline_push(key: &str, close: &str) -> String {
    serde_json::json!({
        "c": key,
        "d": {
            "k": {
                "t": 1661931900, "T": 1661931960,
                "o": "20000", "h": "20100", "l": "19900", "c": close,
                "a": "40000", "v": "2", "i": "Min1"
            },
            "e": "spot@public.kline.v3.api"
        },
        "s": "BTCUSDT",
        "t": 1661931916878i64
    })
    .to_string()
}

async fn wait_for_state(client: &StreamClient, server: &MockServer, topic: &Topic, state: SubscriptionState) -> bool {
    server
        .wait_until(WAIT, || client.subscription_state(topic) == Some(state))
        .await
}

#[tokio::test]
async fn test_ack_confirms_without_invoking_callback() {
    let (client, server) = client();
    let (handler, seen) = collector(&btc());

    let id = client.subscribe(handler).await.unwrap();
    assert_eq!(id, RequestId(1));
    assert!(server.wait_for_commands(1, WAIT).await);
    assert_eq!(
        server.commands()[0],
        serde_json::json!({"id": 1, "method": "SUBSCRIPTION", "params": [btc().key()]})
    );

    server.ack(1, 0, &btc().key());
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::Subscribed).await);
    assert!(seen.lock().is_empty());
}

#[tokio::test]
async fn test_stale_ack_is_ignored() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let hooks = Hooks::new().on_subscription(move |event| sink.lock().push(event.clone()));
    let (client, server) = client_with(config(), hooks);
    let key = btc().key();

    client.subscribe(collector(&btc()).0).await.unwrap();
    client.subscribe(collector(&btc()).0).await.unwrap();
    assert!(server.wait_for_commands(2, WAIT).await);

    server.ack(1, 0, &key);
    server.ack(2, -1, &key);
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::SubscribeFailed).await);

    assert_eq!(
        *events.lock(),
        vec![SubscriptionEvent::Rejected {
            key,
            id: RequestId(2),
            code: -1
        }]
    );
}

#[tokio::test]
async fn test_unsubscribe_unknown_topic_sends_nothing() {
    let (client, server) = client();

    assert_eq!(client.unsubscribe(&btc()).await.unwrap(), None);
    assert_eq!(server.connect_count(), 0);
    assert!(server.sent().is_empty());
}

#[tokio::test]
async fn test_full_subscribe_push_unsubscribe_cycle() {
    let (client, server) = client_with(config().with_close_when_idle(false), Hooks::new());
    let key = btc().key();
    let (handler, seen) = collector(&btc());

    assert_eq!(client.subscribe(handler).await.unwrap(), RequestId(1));
    server.ack(1, 0, &key);
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::Subscribed).await);

    server.push(kline_push(&key, "20050"));
    assert!(server.wait_until(WAIT, || seen.lock().len() == 1).await);
    {
        let seen = seen.lock();
        assert_eq!(seen[0].close, dec!(20050));
        assert_eq!(seen[0].avg_price, dec!(20000));
        assert_eq!(seen[0].interval, Interval::Min1);
    }

    assert_eq!(client.unsubscribe(&btc()).await.unwrap(), Some(RequestId(2)));
    assert!(server.wait_for_commands(2, WAIT).await);
    assert_eq!(server.commands_for("UNSUBSCRIPTION", &key)[0]["id"], 2);

    server.ack(2, 0, &key);
    assert!(server.wait_until(WAIT, || client.subscriptions().is_empty()).await);

    // late ack for the first command, then a push for the removed key
    server.ack(1, 0, &key);
    server.push(kline_push(&key, "20060"));
    server.push(r#"{"id":0,"code":0,"msg":"PONG"}"#);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(client.subscription_state(&btc()).is_none());
    assert_eq!(seen.lock().len(), 1);
}

#[tokio::test]
async fn test_rejected_subscription_is_retried_after_reconnect() {
    let (client, server) = client();
    let key = btc().key();
    let (handler, seen) = collector(&btc());

    client.subscribe(handler).await.unwrap();
    server.ack(1, -1, &key);
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::SubscribeFailed).await);
    assert!(seen.lock().is_empty());
    assert_eq!(client.subscriptions().len(), 1);

    server.drop_connection();
    assert!(server.wait_until(WAIT, || server.commands_for("SUBSCRIPTION", &key).len() == 2).await);

    let retried = &server.commands_for("SUBSCRIPTION", &key)[1];
    assert_eq!(retried["id"], 2);
    assert_eq!(
        client.subscriptions()[0].pending_subscribe,
        Some(RequestId(2))
    );

    server.ack(2, 0, &key);
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::Subscribed).await);
}

#[tokio::test]
async fn test_each_reconnect_resubscribes_every_topic_once() {
    const CYCLES: usize = 3;
    let (client, server) = client();

    client.subscribe(collector(&btc()).0).await.unwrap();
    client.subscribe(collector(&eth()).0).await.unwrap();
    assert!(server.wait_for_commands(2, WAIT).await);
    // one rejected, one accepted
    server.ack(1, -1, &btc().key());
    server.ack(2, 0, &eth().key());

    for cycle in 1..=CYCLES {
        server.drop_connection();
        assert!(server.wait_for_connects(cycle as u32 + 1, WAIT).await);
        assert!(
            server
                .wait_until(WAIT, || {
                    server.commands_for("SUBSCRIPTION", &btc().key()).len() == cycle + 1
                        && server.commands_for("SUBSCRIPTION", &eth().key()).len() == cycle + 1
                })
                .await
        );
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.commands_for("SUBSCRIPTION", &btc().key()).len(), CYCLES + 1);
    assert_eq!(server.commands_for("SUBSCRIPTION", &eth().key()).len(), CYCLES + 1);
}

#[tokio::test]
async fn test_reconnect_waits_for_fresh_ack() {
    let (client, server) = client();
    let key = btc().key();
    client.subscribe(collector(&btc()).0).await.unwrap();
    server.ack(1, 0, &key);
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::Subscribed).await);

    server.drop_connection();
    assert!(server.wait_until(WAIT, || server.commands_for("SUBSCRIPTION", &key).len() == 2).await);
    assert_eq!(client.subscription_state(&btc()), Some(SubscriptionState::Init));

    server.ack(2, 0, &key);
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::Subscribed).await);
}

#[tokio::test]
async fn test_unsubscribe_while_reconnecting_is_last_on_the_wire() {
    let config = config().with_reconnect(ReconnectConfig::fixed(Duration::from_millis(300)));
    let (client, server) = client_with(config, Hooks::new());
    let key = btc().key();
    client.subscribe(collector(&btc()).0).await.unwrap();
    server.ack(1, 0, &key);
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::Subscribed).await);

    server.drop_connection();
    assert!(
        server
            .wait_until(WAIT, || client.connection_state() == ConnectionState::Reconnecting)
            .await
    );
    assert_eq!(client.unsubscribe(&btc()).await.unwrap(), Some(RequestId(2)));

    assert!(server.wait_for_commands(4, WAIT).await);
    let last = server.commands().last().cloned().unwrap();
    assert_eq!(last["method"], "UNSUBSCRIPTION");
    assert_eq!(last["id"], 4);
    assert_eq!(server.commands_for("SUBSCRIPTION", &key).len(), 2);

    for id in 2..=4 {
        server.ack(id, 0, &key);
    }
    assert!(server.wait_until(WAIT, || client.subscriptions().is_empty()).await);
}

#[tokio::test]
async fn test_double_subscribe_keeps_one_record() {
    let (client, server) = client();
    let key = btc().key();
    let (first, first_seen) = collector(&btc());
    let (second, second_seen) = collector(&btc());

    client.subscribe(first).await.unwrap();
    client.subscribe(second).await.unwrap();
    assert_eq!(client.subscriptions().len(), 1);
    assert_eq!(client.subscriptions()[0].pending_subscribe, Some(RequestId(2)));

    server.ack(2, 0, &key);
    assert!(wait_for_state(&client, &server, &btc(), SubscriptionState::Subscribed).await);

    server.push(kline_push(&key, "1"));
    assert!(server.wait_until(WAIT, || second_seen.lock().len() == 1).await);
    assert!(first_seen.lock().is_empty());
}

#[tokio::test]
async fn test_idle_close_then_lazy_reopen() {
    let opens = Arc::new(Mutex::new(Vec::new()));
    let sink = opens.clone();
    let hooks = Hooks::new().on_connect(move |info| sink.lock().push(info.is_reconnection));
    let (client, server) = client_with(config(), hooks);
    let key = btc().key();

    client.subscribe(collector(&btc()).0).await.unwrap();
    server.ack(1, 0, &key);
    client.unsubscribe(&btc()).await.unwrap();
    server.ack(2, 0, &key);

    assert!(server.wait_until(WAIT, || client.connection_state() == ConnectionState::Idle).await);
    assert!(!server.is_connected());

    client.subscribe(collector(&eth()).0).await.unwrap();
    assert!(server.wait_until(WAIT, || server.commands_for("SUBSCRIPTION", &eth().key()).len() == 1).await);
    assert_eq!(server.connect_count(), 2);
    assert_eq!(*opens.lock(), vec![false, false]);
    // a fresh session does not replay old topics
    assert_eq!(server.commands_for("SUBSCRIPTION", &key).len(), 1);
}

#[tokio::test]
async fn test_close_unsubscribes_everything() {
    let (client, server) = client();
    client.subscribe(collector(&btc()).0).await.unwrap();
    client.subscribe(collector(&eth()).0).await.unwrap();

    client.close().await;

    assert_eq!(server.commands_for("UNSUBSCRIPTION", &btc().key()).len(), 1);
    assert_eq!(server.commands_for("UNSUBSCRIPTION", &eth().key()).len(), 1);
    assert_eq!(client.connection_state(), ConnectionState::Closed);
    assert!(!server.is_connected());

    let err = client.subscribe(collector(&btc()).0).await.unwrap_err();
    assert!(matches!(err, MexcError::ShuttingDown));
}

#[tokio::test]
async fn test_subscribe_before_server_is_reachable() {
    let (client, server) = client_with(config().with_timeout(Duration::from_millis(50)), Hooks::new());
    server.fail_next_connects(3);

    // the command stays queued while the connect attempts fail
    client.subscribe(collector(&btc()).0).await.unwrap();
    assert!(server.wait_for_commands(1, WAIT).await);
    assert_eq!(server.commands_for("SUBSCRIPTION", &btc().key()).len(), 1);
    assert_eq!(server.connect_count(), 1);
}

#[tokio::test]
async fn test_garbage_frames_do_not_break_the_connection() {
    let (client, server) = client();
    let key = btc().key();
    let (handler, seen) = collector(&btc());
    client.subscribe(handler).await.unwrap();

    server.push("not json");
    server.push("[]");
    server.push(r#"{"c":"spot@public.kline.v3.api@BTCUSDT@Min1","d":{"k":{}}}"#);
    server.push(r#"{"id":9,"code":0,"msg":"spot@public.deals.v3.api@BTCUSDT"}"#);
    server.push(kline_push(&key, "3"));

    assert!(server.wait_until(WAIT, || seen.lock().len() == 1).await);
    assert_eq!(server.connect_count(), 1);
    assert_eq!(client.connection_state(), ConnectionState::Connected);
}
