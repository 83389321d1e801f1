//! Demo that streams a sample summary over the bus and prints every event as JSON.

use hot_search_aggregator::model::{AiSummary, CoreTopic, DataStatus};
use hot_search_aggregator::stream::{
    push_summary_to_stream, StreamBus, StreamEmitter, SummaryStreamOptions,
};
use hot_search_aggregator::Source;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let bus = StreamBus::default();
    let mut rx = bus.subscribe();
    let emitter = StreamEmitter::new(bus).with_chunking(12, 120);

    let summary = AiSummary {
        summary: "科技发布与体育赛事占据各平台榜首。• 微博讨论度最高".into(),
        core_topics: vec![CoreTopic {
            topic: "新品发布会".into(),
            description: "多平台同步登榜".into(),
            platforms: vec![Source::Weibo, Source::Bilibili],
            heat_level: None,
        }],
        cross_platform_insights: vec!["抖音短视频带动二次传播".into()],
        data_status: DataStatus {
            weibo: Some("正常".into()),
            douyin: Some("降级：使用缓存".into()),
            ..Default::default()
        },
        ..Default::default()
    };

    let spawned = push_summary_to_stream(&emitter, "演示", &summary, SummaryStreamOptions::default())?;

    while let Ok(ev) = rx.recv().await {
        println!("{}", serde_json::to_string(&ev)?);
        if ev.is_terminal() {
            break;
        }
    }
    spawned.handle.await?;

    println!("stream-demo done");
    Ok(())
}
