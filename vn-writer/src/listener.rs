//! # Listener 模块
//!
//! Writer 事件监听。
//!
//! 监听器由 Writer 自己持有的 [`Listeners`] 注册表管理，
//! 注册时返回 [`ListenerId`]，用于之后注销。

/// Writer 事件监听器
///
/// 所有方法默认为空实现，按需覆盖。
pub trait WriterListener {
    /// 开始写，`clip` 为宿主传入的音频片段引用
    fn on_start(&mut self, _clip: Option<&str>) {}

    /// 进入等待（计时等待、标点停顿、等待输入）
    fn on_pause(&mut self) {}

    /// 等待结束
    fn on_resume(&mut self) {}

    /// 写的过程中收到输入
    fn on_input(&mut self) {}

    /// 显示了新的字符/单词
    fn on_glyph(&mut self) {}

    /// 写结束
    fn on_end(&mut self, _stop_audio: bool) {}
}

/// 监听器句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// 监听器注册表
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(ListenerId, Box<dyn WriterListener>)>,
    next_id: u64,
}

impl Listeners {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听器
    pub fn register(&mut self, listener: Box<dyn WriterListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// 注销监听器，返回被移除的监听器
    pub fn unregister(&mut self, id: ListenerId) -> Option<Box<dyn WriterListener>> {
        let index = self.entries.iter().position(|(entry_id, _)| *entry_id == id)?;
        Some(self.entries.remove(index).1)
    }

    /// 监听器个数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn notify(&mut self, mut f: impl FnMut(&mut dyn WriterListener)) {
        for (_, listener) in &mut self.entries {
            f(listener.as_mut());
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct GlyphCounter(Rc<Cell<usize>>);

    impl WriterListener for GlyphCounter {
        fn on_glyph(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_register_and_notify() {
        let count = Rc::new(Cell::new(0));
        let mut listeners = Listeners::new();
        listeners.register(Box::new(GlyphCounter(count.clone())));
        listeners.register(Box::new(GlyphCounter(count.clone())));

        listeners.notify(|l| l.on_glyph());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_unregister() {
        let count = Rc::new(Cell::new(0));
        let mut listeners = Listeners::new();
        let id = listeners.register(Box::new(GlyphCounter(count.clone())));
        assert_eq!(listeners.len(), 1);

        assert!(listeners.unregister(id).is_some());
        assert!(listeners.unregister(id).is_none());
        assert!(listeners.is_empty());

        listeners.notify(|l| l.on_glyph());
        assert_eq!(count.get(), 0);
    }
}
