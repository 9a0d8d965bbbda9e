//! 合成一个头部体模, 走一遍十字光标导航, 输出质量报告并导出.

mod report;
mod runner;

fn main() {
    simple_logger::init_with_level(log::Level::Info).unwrap();

    let outcome = runner::run();
    report::describe(&outcome, &mut std::io::stdout()).unwrap();
}
